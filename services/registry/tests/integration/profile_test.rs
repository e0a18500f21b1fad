use campus_registry::domain::collection::Collection;
use campus_registry::domain::types::{Student, User};
use campus_registry::error::RegistryError;
use campus_registry::infra::memory::MemoryDocumentStore;
use campus_registry::usecase::profile::{
    Identity, RegisterOutcome, RegisterProfileInput, RegisterProfileUseCase,
};

use crate::helpers::{FlakyStore, insert, test_student};

fn usecase(store: &FlakyStore) -> RegisterProfileUseCase<FlakyStore> {
    RegisterProfileUseCase {
        users: Collection::new(store.clone()),
        students: Collection::new(store.clone()),
    }
}

fn register_input(uid: &str, student_code: &str) -> RegisterProfileInput {
    RegisterProfileInput {
        identity: Identity {
            uid: uid.to_owned(),
            email: format!("{uid}@campus.test"),
            email_verified: false,
        },
        student_code: student_code.to_owned(),
        display_name: "Binh".to_owned(),
    }
}

// ── RegisterProfileUseCase ───────────────────────────────────────────────────

#[tokio::test]
async fn should_write_user_then_link_student() {
    let memory = MemoryDocumentStore::new();
    insert(memory.clone(), test_student("S1")).await;
    let store = FlakyStore::new(memory.clone());
    let updates = store.updates_handle();

    let registered = usecase(&store)
        .execute(register_input("u1", "S1"))
        .await
        .unwrap();

    assert_eq!(registered.outcome, RegisterOutcome::Created);
    assert!(!registered.profile.email_verified);
    assert_eq!(
        *updates.lock().unwrap(),
        [("students".to_owned(), "S1".to_owned())]
    );
    let user = Collection::<_, User>::new(memory).get("u1").await.unwrap();
    assert_eq!(user.record.student_code, "S1");
}

#[tokio::test]
async fn should_not_write_anything_for_existing_profile() {
    let memory = MemoryDocumentStore::new();
    insert(memory.clone(), test_student("S1")).await;
    let store = FlakyStore::new(memory.clone());
    usecase(&store)
        .execute(register_input("u1", "S1"))
        .await
        .unwrap();
    let updates = store.updates_handle();
    updates.lock().unwrap().clear();

    let again = usecase(&store)
        .execute(register_input("u1", "S1"))
        .await
        .unwrap();
    assert_eq!(again.outcome, RegisterOutcome::AlreadyExists);
    assert!(updates.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_remove_user_when_student_link_fails() {
    let memory = MemoryDocumentStore::new();
    insert(memory.clone(), test_student("S1")).await;
    let store = FlakyStore {
        fail_update_on: Some("students"),
        ..FlakyStore::new(memory.clone())
    };

    let result = usecase(&store).execute(register_input("u1", "S1")).await;
    assert!(
        matches!(result, Err(RegistryError::Store(_))),
        "expected Store error, got {result:?}"
    );

    let users = Collection::<_, User>::new(memory.clone());
    assert!(users.find("u1").await.unwrap().is_none());
    let student = Collection::<_, Student>::new(memory)
        .get("S1")
        .await
        .unwrap();
    assert!(student.record.user_uid.is_none());
}

#[tokio::test]
async fn should_return_link_error_when_rollback_also_fails() {
    let memory = MemoryDocumentStore::new();
    insert(memory.clone(), test_student("S1")).await;
    let store = FlakyStore {
        fail_update_on: Some("students"),
        fail_delete_on: Some("users"),
        ..FlakyStore::new(memory.clone())
    };

    let result = usecase(&store).execute(register_input("u1", "S1")).await;
    match result {
        Err(RegistryError::Store(error)) => {
            assert!(format!("{error:#}").contains("injected update failure"));
        }
        other => panic!("expected Store error, got {other:?}"),
    }

    // The orphaned user document is left behind for manual cleanup.
    let users = Collection::<_, User>::new(memory);
    assert!(users.find("u1").await.unwrap().is_some());
}

#[tokio::test]
async fn should_allow_only_one_user_per_student() {
    let memory = MemoryDocumentStore::new();
    insert(memory.clone(), test_student("S1")).await;
    let store = FlakyStore::new(memory.clone());

    usecase(&store)
        .execute(register_input("u1", "S1"))
        .await
        .unwrap();
    let result = usecase(&store).execute(register_input("u2", "S1")).await;
    assert!(
        matches!(&result, Err(RegistryError::AlreadyLinked { student_code }) if student_code == "S1"),
        "expected AlreadyLinked, got {result:?}"
    );

    let student = Collection::<_, Student>::new(memory)
        .get("S1")
        .await
        .unwrap();
    assert_eq!(student.record.user_uid.as_deref(), Some("u1"));
}

#[tokio::test]
async fn should_not_create_user_for_unknown_student() {
    let memory = MemoryDocumentStore::new();
    let store = FlakyStore::new(memory.clone());

    let result = usecase(&store).execute(register_input("u1", "NOPE")).await;
    assert!(
        matches!(result, Err(RegistryError::NotFound { entity: "Student", .. })),
        "expected NotFound, got {result:?}"
    );
    let users = Collection::<_, User>::new(memory);
    assert!(users.list().await.unwrap().is_empty());
}
