mod common;

use chrono::DateTime;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::TimeZone;
use chrono::Utc;
use common::TestDb;
use task_service::domain::task::models::DayWindow;
use task_service::domain::task::models::NewTask;
use task_service::domain::task::models::Task;
use task_service::domain::task::models::TaskChanges;
use task_service::domain::task::models::TaskDescription;
use task_service::domain::task::models::TaskId;
use task_service::domain::task::models::TaskStatus;
use task_service::domain::task::ports::TaskRepository;
use task_service::domain::user::errors::UserError;
use task_service::domain::user::models::EmailAddress;
use task_service::domain::user::models::NewUser;
use task_service::domain::user::models::PasswordHash;
use task_service::domain::user::models::User;
use task_service::domain::user::models::Username;
use task_service::domain::user::ports::UserRepository;
use task_service::outbound::repositories::PostgresTaskRepository;
use task_service::outbound::repositories::PostgresUserRepository;

// Whole seconds so values survive the microsecond precision of TIMESTAMPTZ.
fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap()
}

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: Username::new(username.to_string()).expect("Invalid username"),
        email: EmailAddress::new(email.to_string()).expect("Invalid email"),
        password_hash: PasswordHash::new("$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA".to_string()),
        created_at: fixed_time(),
    }
}

fn new_task(owner: &User, description: &str, created_at: DateTime<Utc>) -> NewTask {
    NewTask {
        owner: owner.id,
        description: TaskDescription::new(description.to_string()).expect("Invalid description"),
        status: TaskStatus::default(),
        created_at,
    }
}

async fn create_user(users: &PostgresUserRepository, username: &str) -> User {
    users
        .create(new_user(username, &format!("{}@x.com", username)))
        .await
        .expect("Failed to create user")
}

#[tokio::test]
async fn test_create_and_find_user() {
    let Some(test_database) = TestDb::new().await else {
        return;
    };
    let users = PostgresUserRepository::new(test_database.pool.clone());

    let created = create_user(&users, "alice").await;

    let by_id = users
        .find_by_id(&created.id)
        .await
        .expect("Failed to find user")
        .expect("User missing");
    assert_eq!(by_id.username.as_str(), "alice");
    assert_eq!(by_id.email.as_str(), "alice@x.com");
    assert_eq!(by_id.created_at, fixed_time());

    let by_username = users
        .find_by_username(&Username::new("alice".to_string()).unwrap())
        .await
        .expect("Failed to find user")
        .expect("User missing");
    assert_eq!(by_username.id, created.id);

    let missing = users
        .find_by_username(&Username::new("nobody".to_string()).unwrap())
        .await
        .expect("Failed to query user");
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_duplicate_username_or_email_already_exists() {
    let Some(test_database) = TestDb::new().await else {
        return;
    };
    let users = PostgresUserRepository::new(test_database.pool.clone());
    let original = create_user(&users, "alice").await;

    let same_username = users.create(new_user("alice", "other@x.com")).await;
    assert!(matches!(same_username, Err(UserError::AlreadyExists)));

    let same_email = users.create(new_user("alicia", "alice@x.com")).await;
    assert!(matches!(same_email, Err(UserError::AlreadyExists)));

    let kept = users
        .find_by_id(&original.id)
        .await
        .expect("Failed to find user")
        .expect("User missing");
    assert_eq!(kept.email.as_str(), "alice@x.com");
}

#[tokio::test]
async fn test_foreign_owner_cannot_reach_task() {
    let Some(test_database) = TestDb::new().await else {
        return;
    };
    let users = PostgresUserRepository::new(test_database.pool.clone());
    let tasks = PostgresTaskRepository::new(test_database.pool.clone());
    let alice = create_user(&users, "alice").await;
    let bob = create_user(&users, "bob").await;

    let task = tasks
        .create(new_task(&alice, "buy milk", fixed_time()))
        .await
        .expect("Failed to create task");

    let found = tasks
        .find_by_id_and_owner(&task.id, &bob.id)
        .await
        .expect("Failed to query task");
    assert!(found.is_none());

    let changes = TaskChanges {
        description: None,
        status: Some(TaskStatus::Done),
    };
    let updated = tasks
        .update(&task.id, &bob.id, &changes, fixed_time() + Duration::hours(1))
        .await
        .expect("Failed to update task");
    assert!(updated.is_none());

    let deleted = tasks
        .delete(&task.id, &bob.id)
        .await
        .expect("Failed to delete task");
    assert!(!deleted);

    let untouched = tasks
        .find_by_id_and_owner(&task.id, &alice.id)
        .await
        .expect("Failed to query task")
        .expect("Task missing");
    assert_eq!(untouched.status, TaskStatus::Pending);
    assert_eq!(untouched.updated_at, fixed_time());

    assert!(tasks
        .delete(&task.id, &alice.id)
        .await
        .expect("Failed to delete task"));
    assert!(tasks
        .find_by_id_and_owner(&task.id, &alice.id)
        .await
        .expect("Failed to query task")
        .is_none());
}

#[tokio::test]
async fn test_partial_update_keeps_other_field() {
    let Some(test_database) = TestDb::new().await else {
        return;
    };
    let users = PostgresUserRepository::new(test_database.pool.clone());
    let tasks = PostgresTaskRepository::new(test_database.pool.clone());
    let alice = create_user(&users, "alice").await;
    let task = tasks
        .create(new_task(&alice, "buy milk", fixed_time()))
        .await
        .expect("Failed to create task");

    let status_only = TaskChanges {
        description: None,
        status: Some(TaskStatus::Done),
    };
    let later = fixed_time() + Duration::minutes(5);
    let updated: Task = tasks
        .update(&task.id, &alice.id, &status_only, later)
        .await
        .expect("Failed to update task")
        .expect("Task missing");
    assert_eq!(updated.description.as_str(), "buy milk");
    assert_eq!(updated.status, TaskStatus::Done);
    assert_eq!(updated.created_at, fixed_time());
    assert_eq!(updated.updated_at, later);

    let description_only = TaskChanges {
        description: Some(TaskDescription::new("buy oat milk".to_string()).unwrap()),
        status: None,
    };
    let updated = tasks
        .update(&task.id, &alice.id, &description_only, later)
        .await
        .expect("Failed to update task")
        .expect("Task missing");
    assert_eq!(updated.description.as_str(), "buy oat milk");
    assert_eq!(updated.status, TaskStatus::Done);
}

#[tokio::test]
async fn test_day_window_is_half_open_and_owner_scoped() {
    let Some(test_database) = TestDb::new().await else {
        return;
    };
    let users = PostgresUserRepository::new(test_database.pool.clone());
    let tasks = PostgresTaskRepository::new(test_database.pool.clone());
    let alice = create_user(&users, "alice").await;
    let bob = create_user(&users, "bob").await;

    let window = DayWindow::local(NaiveDate::from_ymd_opt(2024, 3, 14).unwrap())
        .expect("Failed to build day window");

    let placements = [
        ("day before", window.start - Duration::seconds(1)),
        ("first second", window.start),
        ("last second", window.end - Duration::seconds(1)),
        ("next day", window.end),
    ];
    for (description, created_at) in placements {
        tasks
            .create(new_task(&alice, description, created_at))
            .await
            .expect("Failed to create task");
    }
    tasks
        .create(new_task(&bob, "bob's task", window.start))
        .await
        .expect("Failed to create task");

    let listed = tasks
        .find_by_owner_and_date(&alice.id, &window)
        .await
        .expect("Failed to list tasks");

    let descriptions: Vec<&str> = listed.iter().map(|t| t.description.as_str()).collect();
    assert_eq!(descriptions, vec!["first second", "last second"]);
    assert!(listed.iter().all(|t| t.owner == alice.id));
}

#[tokio::test]
async fn test_missing_task_id() {
    let Some(test_database) = TestDb::new().await else {
        return;
    };
    let users = PostgresUserRepository::new(test_database.pool.clone());
    let tasks = PostgresTaskRepository::new(test_database.pool.clone());
    let alice = create_user(&users, "alice").await;

    let found = tasks
        .find_by_id_and_owner(&TaskId(999_999), &alice.id)
        .await
        .expect("Failed to query task");
    assert!(found.is_none());
    assert!(!tasks
        .delete(&TaskId(999_999), &alice.id)
        .await
        .expect("Failed to delete task"));
}
