use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use pfy_config::SweeperConfig;
use pfy_core::entities::{Assignment, TASK_DUE_SOON, TASK_UPDATED};
use pfy_core::enums::UserRole;
use pfy_db::repos::task::NewTask;
use pfy_db::service::PfyService;
use pfy_db::updates::task::TaskUpdateBuilder;
use pfy_notify::{Dispatcher, DueDateSweeper, RoomHub};
use pretty_assertions::assert_eq;

async fn user(svc: &PfyService, name: &str) -> String {
    svc.create_user(name, &format!("{name}@example.com"), UserRole::User, None)
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn update_then_due_reminder_reach_live_member() {
    let svc = Arc::new(PfyService::new_local(":memory:").await.unwrap());
    let owner = user(&svc, "owner").await;
    let member = user(&svc, "member").await;
    let outsider = user(&svc, "outsider").await;
    let group = svc
        .create_group(&owner, "Team", None, None, &[member.clone()])
        .await
        .unwrap();

    let mut new = NewTask::new("Ship it", Utc::now() + TimeDelta::minutes(30));
    new.assignee = Assignment::Group { id: group.id };
    let task = svc.create_task(&owner, new).await.unwrap();

    let hub = RoomHub::new(16);
    let mut member_socket = hub.join(&member);
    let mut outsider_socket = hub.join(&outsider);
    let dispatcher = Dispatcher::new(svc.clone(), hub.clone(), Duration::from_secs(5));

    let update = TaskUpdateBuilder::new().title("Ship it today").build();
    let task = svc.update_task(&task.id, update).await.unwrap();
    let report = dispatcher
        .notify_task(&task.id, "Task \"Ship it today\" was updated", TASK_UPDATED)
        .await
        .unwrap();
    assert_eq!(report.persisted(), 2);
    assert_eq!(report.pushed, 1);

    let frame = member_socket.recv().await.unwrap();
    assert_eq!(frame.event, TASK_UPDATED);
    assert_eq!(frame.payload.receiver_id, member);
    assert_eq!(frame.payload.sender_id, owner);

    let sweeper = DueDateSweeper::new(dispatcher, &SweeperConfig::default());
    let sweep = sweeper.tick().await.unwrap();
    assert_eq!(sweep.notified, 1);

    let frame = member_socket.recv().await.unwrap();
    assert_eq!(frame.event, TASK_DUE_SOON);
    assert_eq!(frame.payload.task_id, task.id);

    assert!(
        tokio::time::timeout(Duration::from_millis(20), outsider_socket.recv())
            .await
            .is_err()
    );

    let inbox = svc.list_notifications(&member).await.unwrap();
    assert_eq!(inbox.data.len(), 2);
    assert_eq!(inbox.unread_count, 2);
    assert!(svc.list_notifications(&outsider).await.unwrap().data.is_empty());
}

#[tokio::test]
async fn offline_recipient_still_gets_a_record() {
    let svc = Arc::new(PfyService::new_local(":memory:").await.unwrap());
    let owner = user(&svc, "owner").await;
    let assignee = user(&svc, "assignee").await;
    let mut new = NewTask::new("Review", Utc::now());
    new.assignee = Assignment::User {
        id: assignee.clone(),
    };
    let task = svc.create_task(&owner, new).await.unwrap();

    let hub = RoomHub::new(4);
    let dispatcher = Dispatcher::new(svc.clone(), hub.clone(), Duration::from_secs(5));
    let report = dispatcher
        .notify_task(&task.id, "Task \"Review\" was updated", TASK_UPDATED)
        .await
        .unwrap();

    assert_eq!(report.persisted(), 2);
    assert_eq!(report.pushed, 0);
    assert_eq!(hub.room_count(), 0);
    assert_eq!(svc.list_notifications(&assignee).await.unwrap().unread_count, 1);
}
