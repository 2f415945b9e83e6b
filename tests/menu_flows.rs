//! Menu Flow Tests
//!
//! Runs the menu loop against a seeded `SQLite` file with scripted console
//! answers. Menu indices follow `roster::menu::MENU`.

#![cfg(feature = "sqlite")]

mod common;

use common::{FakeStore, ScriptedConsole};
use pretty_assertions::assert_eq;
use roster::store::sqlite::SqliteStore;
use roster::impact::{CascadeClass, DependencyEdge};
use roster::{
    EntityKind, ListQuery, MenuCoordinator, MessageClass, Relation, ResultSet, RosterError, Store,
};
use serde_json::json;

const VIEW_DEPARTMENTS: usize = 0;
const VIEW_EMPLOYEES_BY_MANAGER: usize = 3;
const ADD_DEPARTMENT: usize = 4;
const ADD_ROLE: usize = 5;
const ADD_EMPLOYEE: usize = 6;
const UPDATE_EMPLOYEE_ROLE: usize = 7;
const DELETE_DEPARTMENT: usize = 8;
const DELETE_ROLE: usize = 9;
const DELETE_EMPLOYEE: usize = 10;
const QUIT: usize = 11;

async fn seeded_store(name: &str) -> SqliteStore {
    let file = std::env::temp_dir().join(format!("roster_menu_{}_{name}.db", std::process::id()));
    let _ = std::fs::remove_file(&file);
    let store = SqliteStore::new(file);
    store.init_schema().await.expect("Failed to create schema");
    store.seed().await.expect("Failed to seed");
    store
}

fn cleanup(store: &SqliteStore) {
    let _ = std::fs::remove_file(store.file());
}

async fn run(store: &SqliteStore, console: &mut ScriptedConsole) {
    MenuCoordinator::new(store, console).run().await.expect("menu loop failed");
}

#[tokio::test]
async fn test_view_departments_then_quit() {
    let store = seeded_store("view_departments").await;
    let mut console = ScriptedConsole::new().then_select(VIEW_DEPARTMENTS).then_select(QUIT);

    run(&store, &mut console).await;

    assert_eq!(console.printed.len(), 1);
    let lines: Vec<&str> = console.printed[0].lines().collect();
    assert_eq!(lines[0].trim_end(), "id name");
    assert_eq!(lines[1], "-- -----------");
    assert_eq!(lines[2], "1  Engineering");
    assert_eq!(lines[5].trim_end(), "4  Sales");
    assert_eq!(console.shown_of(MessageClass::Info), vec!["Goodbye!".to_string()]);
    assert_eq!(console.select_prompts[0].0, "What would you like to do?");
    assert_eq!(console.select_prompts[0].1.len(), 12);

    cleanup(&store);
}

#[tokio::test]
async fn test_add_department() {
    let store = seeded_store("add_department").await;
    let mut console = ScriptedConsole::new()
        .then_select(ADD_DEPARTMENT)
        .then_input("  Marketing ")
        .then_select(QUIT);

    run(&store, &mut console).await;

    assert_eq!(
        console.shown_of(MessageClass::Success),
        vec!["Added Marketing to the database".to_string()]
    );
    let departments = store.fetch(ListQuery::Departments).await.unwrap();
    assert_eq!(departments.len(), 5);
    assert_eq!(departments.value(4, "name"), Some(&serde_json::json!("Marketing")));

    cleanup(&store);
}

#[tokio::test]
async fn test_blank_department_name_is_rejected_and_loop_continues() {
    let store = seeded_store("blank_department").await;
    let mut console = ScriptedConsole::new()
        .then_select(ADD_DEPARTMENT)
        .then_input("   ")
        .then_select(VIEW_DEPARTMENTS)
        .then_select(QUIT);

    run(&store, &mut console).await;

    assert_eq!(
        console.shown_of(MessageClass::Error),
        vec!["Invalid input: Department name cannot be empty".to_string()]
    );
    assert_eq!(console.printed.len(), 1);
    assert_eq!(store.fetch(ListQuery::Departments).await.unwrap().len(), 4);

    cleanup(&store);
}

#[tokio::test]
async fn test_add_role_rejects_non_numeric_salary() {
    let store = seeded_store("bad_salary").await;
    let mut console = ScriptedConsole::new()
        .then_select(ADD_ROLE)
        .then_input("Analyst")
        .then_input("lots")
        .then_select(QUIT);

    run(&store, &mut console).await;

    let errors = console.shown_of(MessageClass::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Salary must be a non-negative number"));
    assert_eq!(store.fetch(ListQuery::Roles).await.unwrap().len(), 8);

    cleanup(&store);
}

#[tokio::test]
async fn test_add_role() {
    let store = seeded_store("add_role").await;
    let mut console = ScriptedConsole::new()
        .then_select(ADD_ROLE)
        .then_input("Paralegal")
        .then_input("65000")
        .then_select(2)
        .then_select(QUIT);

    run(&store, &mut console).await;

    assert_eq!(
        console.shown_of(MessageClass::Success),
        vec!["Added Paralegal to the database".to_string()]
    );
    let roles = store.fetch(ListQuery::Roles).await.unwrap();
    assert_eq!(roles.len(), 9);
    assert_eq!(roles.value(8, "department"), Some(&serde_json::json!("Legal")));

    cleanup(&store);
}

#[tokio::test]
async fn test_add_employee_with_manager() {
    let store = seeded_store("add_employee").await;
    let mut console = ScriptedConsole::new()
        .then_select(ADD_EMPLOYEE)
        .then_input("Jane")
        .then_input("Roe")
        // Software Engineer
        .then_select(0)
        // "None" comes first, so index 3 is the third employee
        .then_select(3)
        .then_select(QUIT);

    run(&store, &mut console).await;

    let (prompt, managers) = &console.select_prompts[2];
    assert_eq!(prompt, "Who is the employee's manager?");
    assert_eq!(managers[0], "None");
    assert_eq!(managers[3], "Ashley Rodriguez");

    let employees = store.fetch(ListQuery::Employees).await.unwrap();
    assert_eq!(employees.len(), 9);
    assert_eq!(employees.value(8, "title"), Some(&serde_json::json!("Software Engineer")));
    assert_eq!(employees.value(8, "manager"), Some(&serde_json::json!("Ashley Rodriguez")));

    cleanup(&store);
}

#[tokio::test]
async fn test_update_employee_role() {
    let store = seeded_store("update_role").await;
    let mut console = ScriptedConsole::new()
        .then_select(UPDATE_EMPLOYEE_ROLE)
        // Mike Chan
        .then_select(1)
        // Sales Lead
        .then_select(7)
        .then_select(QUIT);

    run(&store, &mut console).await;

    assert_eq!(
        console.shown_of(MessageClass::Success),
        vec!["Updated employee's role".to_string()]
    );
    let employees = store.fetch(ListQuery::Employees).await.unwrap();
    assert_eq!(employees.value(1, "title"), Some(&serde_json::json!("Sales Lead")));

    cleanup(&store);
}

#[tokio::test]
async fn test_view_employees_by_manager() {
    let store = seeded_store("by_manager").await;
    let mut console = ScriptedConsole::new()
        .then_select(VIEW_EMPLOYEES_BY_MANAGER)
        // John Doe
        .then_select(0)
        .then_select(QUIT);

    run(&store, &mut console).await;

    let managers = &console.select_prompts[1].1;
    assert_eq!(managers, &["John Doe", "Ashley Rodriguez", "Kunal Singh", "Sarah Lourd"]);
    assert_eq!(console.printed.len(), 1);
    assert!(console.printed[0].contains("Mike"));
    assert!(!console.printed[0].contains("Kevin"));

    cleanup(&store);
}

#[tokio::test]
async fn test_delete_department_confirmed() {
    let store = seeded_store("delete_department").await;
    let mut console = ScriptedConsole::new()
        .then_select(DELETE_DEPARTMENT)
        // Sales
        .then_select(3)
        .then_confirm(true)
        .then_select(QUIT);

    run(&store, &mut console).await;

    let warnings = console.shown_of(MessageClass::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("Deleting department #4 will affect other records:"));
    assert!(warnings[0].contains("2 roles will be deleted"));
    assert!(warnings[0].contains("2 employees will be left referencing a missing role"));
    assert_eq!(console.confirm_prompts, vec!["Delete department #4?".to_string()]);
    assert_eq!(
        console.shown_of(MessageClass::Success),
        vec!["Deleted department #4 (2 removed, 2 orphaned)".to_string()]
    );

    assert_eq!(store.fetch(ListQuery::Roles).await.unwrap().len(), 6);
    let employees = store.fetch(ListQuery::Employees).await.unwrap();
    assert_eq!(employees.len(), 8);
    assert_eq!(employees.value(0, "title"), Some(&serde_json::Value::Null));

    cleanup(&store);
}

#[tokio::test]
async fn test_delete_employee_declined() {
    let store = seeded_store("delete_declined").await;
    let mut console = ScriptedConsole::new()
        .then_select(DELETE_EMPLOYEE)
        // John Doe
        .then_select(0)
        .then_confirm(false)
        .then_select(QUIT);

    run(&store, &mut console).await;

    assert_eq!(
        console.shown_of(MessageClass::Cancelled),
        vec!["Deletion of employee #1 cancelled; nothing was changed".to_string()]
    );
    let employees = store.fetch(ListQuery::Employees).await.unwrap();
    assert_eq!(employees.len(), 8);
    assert_eq!(employees.value(1, "manager"), Some(&serde_json::json!("John Doe")));

    cleanup(&store);
}

#[tokio::test]
async fn test_empty_database() {
    let file = std::env::temp_dir().join(format!("roster_menu_{}_empty.db", std::process::id()));
    let _ = std::fs::remove_file(&file);
    let store = SqliteStore::new(file);
    store.init_schema().await.unwrap();

    let mut console = ScriptedConsole::new()
        .then_select(VIEW_DEPARTMENTS)
        .then_select(DELETE_ROLE)
        .then_select(QUIT);

    run(&store, &mut console).await;

    assert_eq!(console.printed, vec!["No results found.".to_string()]);
    assert_eq!(
        console.shown_of(MessageClass::Info),
        vec!["No roles found.".to_string(), "Goodbye!".to_string()]
    );
    assert!(console.confirm_prompts.is_empty());

    cleanup(&store);
}

#[tokio::test]
async fn test_store_failure_is_reported_and_loop_continues() {
    let store = FakeStore::new();
    let mut console = ScriptedConsole::new().then_select(VIEW_DEPARTMENTS).then_select(QUIT);

    MenuCoordinator::new(&store, &mut console).run().await.unwrap();

    let errors: Vec<String> =
        console.shown.iter().filter(|m| m.class == MessageClass::Error).map(ToString::to_string).collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("ERROR: Data access failed:"));
    assert_eq!(console.shown.last().map(|m| m.text.as_str()), Some("Goodbye!"));
}

#[tokio::test]
async fn test_closed_console_ends_loop() {
    let store = seeded_store("closed_console").await;
    let mut console = ScriptedConsole::new().then_select(VIEW_DEPARTMENTS);

    let err = MenuCoordinator::new(&store, &mut console).run().await.unwrap_err();

    assert!(matches!(err, RosterError::Prompt(_)));
    assert_eq!(console.printed.len(), 1);

    cleanup(&store);
}

#[tokio::test]
async fn test_update_of_vanished_employee_warns() {
    let employees = ResultSet::new(["id", "first_name", "last_name"])
        .unwrap()
        .with_row(vec![json!(5), json!("Kunal"), json!("Singh")])
        .unwrap();
    let roles = ResultSet::new(["id", "title"])
        .unwrap()
        .with_row(vec![json!(3), json!("Accountant")])
        .unwrap();
    let store = FakeStore::new()
        .with_listing(ListQuery::Employees, employees)
        .with_listing(ListQuery::Roles, roles)
        .updating(0);
    let mut console = ScriptedConsole::new()
        .then_select(UPDATE_EMPLOYEE_ROLE)
        .then_select(0)
        .then_select(0)
        .then_select(QUIT);

    MenuCoordinator::new(&store, &mut console).run().await.unwrap();

    assert_eq!(
        console.shown_of(MessageClass::Warning),
        vec!["Employee #5 not found".to_string()]
    );
    assert!(console.shown_of(MessageClass::Success).is_empty());
    assert!(console.shown_of(MessageClass::Error).is_empty());
}

const MISREGISTERED: &[DependencyEdge] = &[DependencyEdge {
    name: "role → reports",
    parent: EntityKind::Role,
    dependent: EntityKind::Employee,
    relation: Relation::DirectReports,
    class: CascadeClass::Orphans,
    reference: "manager",
}];

#[tokio::test]
async fn test_misconfigured_dependency_table_stops_before_the_menu() {
    let store = FakeStore::new();
    let mut console = ScriptedConsole::new().then_select(DELETE_ROLE).then_select(QUIT);

    let err = MenuCoordinator::new(&store, &mut console)
        .with_dependencies(MISREGISTERED)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, RosterError::Misconfigured(_)));
    assert!(console.select_prompts.is_empty());
    assert!(store.deletes().is_empty());
}
