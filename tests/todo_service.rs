mod common;

use common::{admin, app, draft, user};
use rstest::*;
use todo_worker::models::{Category, Identity, Role};
use todo_worker::services::todo_service;
use todo_worker::utils::errors::AppError;

#[tokio::test]
async fn create_sets_owner_and_defaults() {
    let app = app();
    let alice = user(&app, "alice").await;

    let todo = todo_service::create(&app, &alice, draft("Buy milk", "Urgent"))
        .await
        .unwrap();

    assert_eq!(todo.user_id, alice.id);
    assert_eq!(todo.username, "alice");
    assert!(!todo.completed);
    assert_eq!(todo.category, Category::Urgent);
}

#[tokio::test]
async fn create_rejects_invalid_drafts() {
    let app = app();
    let alice = user(&app, "alice").await;

    let err = todo_service::create(&app, &alice, draft(&"x".repeat(101), "Urgent"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    let err = todo_service::create(&app, &alice, draft("ok", "Whenever"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), 400);
    assert!(todo_service::list(&app, &alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_requires_existing_owner() {
    let app = app();
    let ghost = Identity {
        id: 99,
        username: "ghost".into(),
        role: Role::User,
    };
    let err = todo_service::create(&app, &ghost, draft("Boo", "Urgent"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));
}

#[tokio::test]
async fn list_returns_only_own_todos() {
    let app = app();
    let alice = user(&app, "alice").await;
    let bob = user(&app, "bob").await;
    todo_service::create(&app, &alice, draft("a1", "Urgent")).await.unwrap();
    todo_service::create(&app, &alice, draft("a2", "Non-Urgent")).await.unwrap();
    todo_service::create(&app, &bob, draft("b1", "Urgent")).await.unwrap();

    let titles: Vec<String> = todo_service::list(&app, &alice)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["a1", "a2"]);
    assert_eq!(todo_service::list(&app, &bob).await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_all_is_admin_only() {
    let app = app();
    let alice = user(&app, "alice").await;
    let root = admin(&app, "root").await;
    todo_service::create(&app, &alice, draft("a1", "Urgent")).await.unwrap();

    assert!(matches!(
        todo_service::list_all(&app, &alice).await,
        Err(AppError::Forbidden(_))
    ));
    assert_eq!(todo_service::list_all(&app, &root).await.unwrap().len(), 1);
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Get,
    Update,
    Delete,
    Toggle,
}

async fn run(app: &todo_worker::utils::context::AppContext, who: &Identity, id: i64, op: Op) -> Result<(), AppError> {
    match op {
        Op::Get => todo_service::get(app, who, id).await.map(|_| ()),
        Op::Update => todo_service::update(app, who, id, draft("edited", "Urgent"))
            .await
            .map(|_| ()),
        Op::Delete => todo_service::delete(app, who, id).await,
        Op::Toggle => todo_service::toggle(app, who, id).await.map(|_| ()),
    }
}

#[rstest]
#[case(Op::Get)]
#[case(Op::Update)]
#[case(Op::Delete)]
#[case(Op::Toggle)]
#[tokio::test]
async fn non_owner_is_forbidden(#[case] op: Op) {
    let app = app();
    let alice = user(&app, "alice").await;
    let bob = user(&app, "bob").await;
    let todo = todo_service::create(&app, &alice, draft("mine", "Urgent")).await.unwrap();

    let err = run(&app, &bob, todo.id, op).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "{op:?}: {err:?}");
    assert_eq!(err.status(), 403);

    // untouched
    let still = todo_service::get(&app, &alice, todo.id).await.unwrap();
    assert_eq!(still, todo);
}

#[rstest]
#[case(Op::Get)]
#[case(Op::Update)]
#[case(Op::Delete)]
#[case(Op::Toggle)]
#[tokio::test]
async fn admin_may_act_on_any_todo(#[case] op: Op) {
    let app = app();
    let alice = user(&app, "alice").await;
    let root = admin(&app, "root").await;
    let todo = todo_service::create(&app, &alice, draft("mine", "Urgent")).await.unwrap();

    run(&app, &root, todo.id, op).await.unwrap();
}

#[rstest]
#[case(Op::Get)]
#[case(Op::Update)]
#[case(Op::Delete)]
#[case(Op::Toggle)]
#[tokio::test]
async fn missing_todo_is_not_found(#[case] op: Op) {
    let app = app();
    let alice = user(&app, "alice").await;
    let err = run(&app, &alice, 42, op).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{op:?}: {err:?}");
}

#[tokio::test]
async fn update_checks_validation_before_existence() {
    let app = app();
    let alice = user(&app, "alice").await;
    let err = todo_service::update(&app, &alice, 42, draft("", "Urgent"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));
}

#[tokio::test]
async fn update_overwrites_only_editable_fields() {
    let app = app();
    let alice = user(&app, "alice").await;
    let root = admin(&app, "root").await;
    let todo = todo_service::create(&app, &alice, draft("old", "Non-Urgent")).await.unwrap();
    todo_service::toggle(&app, &alice, todo.id).await.unwrap();

    let mut edit = draft("new", "Urgent");
    edit.description = Some("details".into());
    edit.due_date = Some("2025-12-24".into());
    let updated = todo_service::update(&app, &root, todo.id, edit).await.unwrap();

    assert_eq!(updated.id, todo.id);
    assert_eq!(updated.title, "new");
    assert_eq!(updated.description.as_deref(), Some("details"));
    assert_eq!(updated.due_date.as_deref(), Some("2025-12-24"));
    assert_eq!(updated.category, Category::Urgent);
    assert!(updated.completed);
    assert_eq!(updated.user_id, alice.id);
    assert_eq!(updated.username, "alice", "admin edits keep the owner's name");
}

#[tokio::test]
async fn toggle_twice_restores_completion() {
    let app = app();
    let alice = user(&app, "alice").await;
    let todo = todo_service::create(&app, &alice, draft("flip", "Urgent")).await.unwrap();

    let once = todo_service::toggle(&app, &alice, todo.id).await.unwrap();
    assert!(once.completed);
    let twice = todo_service::toggle(&app, &alice, todo.id).await.unwrap();
    assert_eq!(twice.completed, todo.completed);
}

#[tokio::test]
async fn delete_removes_the_todo() {
    let app = app();
    let alice = user(&app, "alice").await;
    let todo = todo_service::create(&app, &alice, draft("gone", "Urgent")).await.unwrap();

    todo_service::delete(&app, &alice, todo.id).await.unwrap();
    assert!(matches!(
        todo_service::get(&app, &alice, todo.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        todo_service::delete(&app, &alice, todo.id).await,
        Err(AppError::NotFound(_))
    ));
}
