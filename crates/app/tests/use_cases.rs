use std::sync::{Arc, Mutex};

use pocketbook_app::repositories::{ClientLookup, EntryFilter, GoalFilter};
use pocketbook_app::use_cases::{
    CreateExpenseRequest, CreateGoalRequest, CreateIncomeRequest, RegisterClientRequest,
};
use pocketbook_app::{App, AppConfig, SearchParams, SortDirection, UseCaseError};
use pocketbook_core::{EmitsEvents, Entity};
use pocketbook_events::{DispatchError, DomainEvent};
use pocketbook_finance::{ClientEvent, ClientEventKind, ClientId, Money, ProfileUpdate};

fn money(s: &str) -> Money {
    Money::parse(s).unwrap()
}

fn app() -> App {
    App::in_memory(AppConfig::default())
}

fn register(app: &App, email: &str, monthly_income: &str) -> ClientId {
    app.use_cases
        .register_client(RegisterClientRequest {
            name: "Dora".to_string(),
            email: email.to_string(),
            password_hash: "argon2-hash".to_string(),
            phone_number: None,
            avatar_url: None,
            monthly_income: Some(money(monthly_income)),
        })
        .unwrap()
        .id_typed()
}

fn income_request(client_id: ClientId, amount: &str) -> CreateIncomeRequest {
    CreateIncomeRequest {
        client_id,
        amount: money(amount),
        date: None,
        description: Some("freelance".to_string()),
        category: Some("Work".to_string()),
    }
}

fn expense_request(client_id: ClientId, amount: &str) -> CreateExpenseRequest {
    CreateExpenseRequest {
        client_id,
        amount: money(amount),
        date: None,
        description: None,
        category: Some("Rent".to_string()),
    }
}

fn goal_request(client_id: ClientId, target: &str) -> CreateGoalRequest {
    CreateGoalRequest {
        client_id,
        target: money(target),
        saved: None,
        started_at: None,
        ended_at: None,
    }
}

#[test]
fn balance_scenario_end_to_end() {
    let app = app();
    let client_id = register(&app, "dora@example.com", "5000.00");

    app.use_cases
        .create_income(income_request(client_id, "100.00"))
        .unwrap();
    app.use_cases
        .create_expense(expense_request(client_id, "700.00"))
        .unwrap();
    assert_eq!(
        app.use_cases.get_client(&client_id).unwrap().balance(),
        money("4400.00")
    );

    let err = app
        .use_cases
        .create_expense(expense_request(client_id, "5000.00"))
        .unwrap_err();
    assert_eq!(err.code(), "validation_error");

    let client = app.use_cases.get_client(&client_id).unwrap();
    assert_eq!(client.balance(), money("4400.00"));
    assert_eq!(client.expenses().len(), 1);
    assert!(client.domain_events().is_empty());
    assert_eq!(app.registry.marked_count(), 0);
}

#[test]
fn subscribers_persist_children_after_the_client_is_saved() {
    let app = app();
    let client_id = register(&app, "order@example.com", "0");

    let clients = Arc::clone(&app.use_cases.repositories().clients);
    let saw_saved_income = Arc::new(Mutex::new(false));
    {
        let saw = Arc::clone(&saw_saved_income);
        app.registry
            .register(ClientEventKind::IncomeAdded, move |event: &ClientEvent| {
                let stored = clients
                    .find_unique(&ClientLookup::Id(event.aggregate_id()))?
                    .ok_or_else(|| anyhow::anyhow!("client missing"))?;
                *saw.lock().unwrap() = stored.incomes().len() == 1;
                Ok(())
            });
    }

    let income = app
        .use_cases
        .create_income(income_request(client_id, "42"))
        .unwrap();

    assert!(*saw_saved_income.lock().unwrap());
    let stored = app
        .use_cases
        .get_income(&client_id, income.id())
        .unwrap();
    assert_eq!(stored.amount(), money("42"));
    assert_eq!(stored.category().map(|c| c.as_str()), Some("Work"));
}

#[test]
fn children_of_other_clients_are_not_allowed() {
    let app = app();
    let alice = register(&app, "alice@example.com", "100");
    let bob = register(&app, "bob@example.com", "100");

    let income = app
        .use_cases
        .create_income(income_request(alice, "10"))
        .unwrap();

    assert!(matches!(
        app.use_cases.get_income(&bob, income.id()),
        Err(UseCaseError::NotAllowed)
    ));
    assert!(matches!(
        app.use_cases.remove_income(&bob, income.id()),
        Err(UseCaseError::NotAllowed)
    ));
    assert!(matches!(
        app.use_cases
            .remove_income(&alice, &pocketbook_finance::IncomeId::new()),
        Err(UseCaseError::IncomeNotFound)
    ));
    assert!(matches!(
        app.use_cases.get_client(&ClientId::new()),
        Err(UseCaseError::ClientNotFound)
    ));
}

#[test]
fn removing_children_deletes_their_rows() {
    let app = app();
    let client_id = register(&app, "rm@example.com", "100");

    let income = app
        .use_cases
        .create_income(income_request(client_id, "50"))
        .unwrap();
    let expense = app
        .use_cases
        .create_expense(expense_request(client_id, "30"))
        .unwrap();

    app.use_cases.remove_expense(&client_id, expense.id()).unwrap();
    app.use_cases.remove_income(&client_id, income.id()).unwrap();

    assert!(matches!(
        app.use_cases.get_expense(&client_id, expense.id()),
        Err(UseCaseError::ExpenseNotFound)
    ));
    assert!(matches!(
        app.use_cases.get_income(&client_id, income.id()),
        Err(UseCaseError::IncomeNotFound)
    ));
    assert_eq!(
        app.use_cases.get_client(&client_id).unwrap().balance(),
        money("100")
    );
}

#[test]
fn removing_spent_income_is_rejected() {
    let app = app();
    let client_id = register(&app, "spent@example.com", "0");
    let income = app
        .use_cases
        .create_income(income_request(client_id, "50"))
        .unwrap();
    app.use_cases
        .create_expense(expense_request(client_id, "40"))
        .unwrap();

    let err = app
        .use_cases
        .remove_income(&client_id, income.id())
        .unwrap_err();
    assert!(matches!(err, UseCaseError::Domain(_)));
    assert!(app.use_cases.get_income(&client_id, income.id()).is_ok());
}

#[test]
fn goal_lifecycle() {
    let app = app();
    let client_id = register(&app, "saver@example.com", "0");
    let goal = app
        .use_cases
        .create_goal(goal_request(client_id, "1000"))
        .unwrap();

    let reached = Arc::new(Mutex::new(0));
    {
        let reached = Arc::clone(&reached);
        app.registry
            .register(ClientEventKind::GoalReached, move |_event: &ClientEvent| {
                *reached.lock().unwrap() += 1;
                Ok(())
            });
    }

    app.use_cases
        .contribute_to_goal(&client_id, goal.id(), money("400"))
        .unwrap();
    let updated = app
        .use_cases
        .contribute_to_goal(&client_id, goal.id(), money("600"))
        .unwrap();
    assert!(updated.is_reached());
    assert_eq!(*reached.lock().unwrap(), 1);

    let stored = app.use_cases.get_goal(&client_id, goal.id()).unwrap();
    assert_eq!(stored.saved(), money("1000"));
    assert_eq!(stored.progress_percent(), 100);

    let err = app
        .use_cases
        .contribute_to_goal(&client_id, goal.id(), money("1"))
        .unwrap_err();
    assert!(matches!(err, UseCaseError::Domain(_)));
    assert_eq!(*reached.lock().unwrap(), 1);

    let done = app
        .use_cases
        .list_goals(
            &client_id,
            SearchParams::new(GoalFilter {
                reached: Some(true),
                ..GoalFilter::default()
            }),
        )
        .unwrap();
    assert_eq!(done.meta.total, 1);

    app.use_cases.remove_goal(&client_id, goal.id()).unwrap();
    assert!(matches!(
        app.use_cases.get_goal(&client_id, goal.id()),
        Err(UseCaseError::GoalNotFound)
    ));
    assert!(matches!(
        app.use_cases
            .contribute_to_goal(&client_id, goal.id(), money("1")),
        Err(UseCaseError::GoalNotFound)
    ));
}

#[test]
fn listings_use_the_configured_page_size() {
    let app = App::in_memory(AppConfig {
        default_page_size: 2,
        ..AppConfig::default()
    });
    let client_id = register(&app, "pages@example.com", "0");
    let other = register(&app, "other@example.com", "0");
    for amount in ["1", "2", "3", "4", "5"] {
        app.use_cases
            .create_income(income_request(client_id, amount))
            .unwrap();
    }
    app.use_cases
        .create_income(income_request(other, "9"))
        .unwrap();

    let page = app
        .use_cases
        .list_incomes(
            &client_id,
            SearchParams::new(EntryFilter::for_client(other)).sorted(SortDirection::Asc),
        )
        .unwrap();

    assert_eq!(page.meta.per_page, 2);
    assert_eq!(page.meta.total, 5);
    assert_eq!(page.meta.total_pages, 3);
    assert!(page.data.iter().all(|i| i.client_id() == client_id));
}

#[test]
fn duplicate_emails_are_rejected() {
    let app = app();
    let first = register(&app, "same@example.com", "0");
    register(&app, "taken@example.com", "0");

    let err = app
        .use_cases
        .register_client(RegisterClientRequest {
            name: "Copy".to_string(),
            email: "SAME@example.com".to_string(),
            password_hash: "hash".to_string(),
            phone_number: None,
            avatar_url: None,
            monthly_income: None,
        })
        .unwrap_err();
    assert_eq!(err.code(), "client_already_exists");

    let err = app
        .use_cases
        .update_client(
            &first,
            ProfileUpdate {
                email: Some("taken@example.com".to_string()),
                ..ProfileUpdate::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, UseCaseError::ClientAlreadyExists));

    let renamed = app
        .use_cases
        .update_client(
            &first,
            ProfileUpdate {
                name: Some("Dora Lima".to_string()),
                ..ProfileUpdate::default()
            },
        )
        .unwrap();
    assert_eq!(renamed.name(), "Dora Lima");
    assert_eq!(app.use_cases.get_client(&first).unwrap().name(), "Dora Lima");
}

#[test]
fn failing_handlers_do_not_undo_the_saved_change() {
    let app = app();
    let client_id = register(&app, "fail@example.com", "0");
    app.registry
        .register(ClientEventKind::BalanceUpdated, |_event: &ClientEvent| {
            anyhow::bail!("notification gateway down")
        });

    let err = app
        .use_cases
        .create_income(income_request(client_id, "10"))
        .unwrap_err();

    let failures = match err {
        UseCaseError::Dispatch(DispatchError::HandlersFailed { failures, .. }) => failures,
        other => panic!("expected a dispatch failure, got {other:?}"),
    };
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].event_type, "client.balance_updated");

    let client = app.use_cases.get_client(&client_id).unwrap();
    assert_eq!(client.balance(), money("10"));
    assert_eq!(
        app.use_cases
            .list_incomes(&client_id, SearchParams::default())
            .unwrap()
            .meta
            .total,
        1
    );
    assert!(!app.registry.is_marked(&client_id));
}

#[test]
fn monthly_income_updates_are_saved() {
    let app = app();
    let client_id = register(&app, "salary@example.com", "0");

    let client = app
        .use_cases
        .set_monthly_income(&client_id, money("3200.50"))
        .unwrap();
    assert_eq!(client.balance(), money("3200.50"));
    assert_eq!(
        app.use_cases.get_client(&client_id).unwrap().monthly_income(),
        money("3200.50")
    );
}
