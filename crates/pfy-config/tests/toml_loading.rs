use std::path::Path;

use figment::Jail;
use pfy_config::PfyConfig;
use pretty_assertions::assert_eq;

#[test]
fn project_toml_overrides_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "projectify.toml",
            r#"
            [database]
            path = "data/tasks.db"

            [sweeper]
            lookahead_secs = 1800

            [general]
            default_limit = 25
            "#,
        )?;

        let config = PfyConfig::load(None).expect("config loads");
        assert_eq!(config.database.path, "data/tasks.db");
        assert_eq!(config.sweeper.lookahead_secs, 1800);
        assert_eq!(config.sweeper.interval_secs, 300);
        assert_eq!(config.general.default_limit, 25);
        Ok(())
    });
}

#[test]
fn explicit_file_beats_project_toml() {
    Jail::expect_with(|jail| {
        jail.create_file("projectify.toml", "[dispatch]\nrecipient_timeout_ms = 100\n")?;
        jail.create_file("override.toml", "[dispatch]\nrecipient_timeout_ms = 250\n")?;

        let config = PfyConfig::load(Some(Path::new("override.toml"))).expect("config loads");
        assert_eq!(config.dispatch.recipient_timeout_ms, 250);
        Ok(())
    });
}

#[test]
fn malformed_toml_is_an_error() {
    Jail::expect_with(|jail| {
        jail.create_file("projectify.toml", "[sweeper\ninterval_secs = ")?;
        assert!(PfyConfig::load(None).is_err());
        Ok(())
    });
}

#[test]
fn allowed_origins_parse_as_list() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "projectify.toml",
            r#"
            [server]
            allowed_origins = ["http://localhost:5173", "https://projectify.example"]
            "#,
        )?;

        let config = PfyConfig::load(None).expect("config loads");
        assert_eq!(config.server.allowed_origins.len(), 2);
        assert!(config.server.origin_allowed(Some("http://localhost:5173")));
        Ok(())
    });
}
