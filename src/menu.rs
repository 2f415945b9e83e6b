//! Interactive Menu
//!
//! Drives the read-eval loop: show the main menu, run the chosen action,
//! report the result, repeat until Quit. Actions are a closed enum looked up
//! by position in [`MENU`]; each action awaits its store calls and prompts
//! strictly in sequence.
//!
//! Data-access and validation failures are reported as `ERROR: ...`, a
//! vanished row as `WARNING: ...`, and the loop continues. Fatal errors (a
//! failing prompt, a misconfigured dependency table) end the loop.

use crate::error::{Result, RosterError};
use crate::impact::{validate_edges, DependencyEdge};
use crate::output::Message;
use crate::prompt::Console;
use crate::store::{EntityKind, ListQuery, NewEmployee, NewRole, ResultSet, Store};
use crate::table::{display_value, render};
use crate::workflow::{DeletionOutcome, DeletionWorkflow};

/// Everything the main menu offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ViewDepartments,
    ViewRoles,
    ViewEmployees,
    ViewEmployeesByManager,
    AddDepartment,
    AddRole,
    AddEmployee,
    UpdateEmployeeRole,
    DeleteDepartment,
    DeleteRole,
    DeleteEmployee,
    Quit,
}

/// Main menu entries in display order
pub const MENU: &[(MenuAction, &str)] = &[
    (MenuAction::ViewDepartments, "View All Departments"),
    (MenuAction::ViewRoles, "View All Roles"),
    (MenuAction::ViewEmployees, "View All Employees"),
    (MenuAction::ViewEmployeesByManager, "View Employees by Manager"),
    (MenuAction::AddDepartment, "Add a Department"),
    (MenuAction::AddRole, "Add a Role"),
    (MenuAction::AddEmployee, "Add an Employee"),
    (MenuAction::UpdateEmployeeRole, "Update an Employee Role"),
    (MenuAction::DeleteDepartment, "Delete a Department"),
    (MenuAction::DeleteRole, "Delete a Role"),
    (MenuAction::DeleteEmployee, "Delete an Employee"),
    (MenuAction::Quit, "Quit"),
];

impl MenuAction {
    /// Menu label of this action
    #[must_use]
    pub fn label(self) -> &'static str {
        MENU.iter().find(|(action, _)| *action == self).map_or("", |(_, label)| label)
    }
}

/// Whether the loop keeps going after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A selectable entity: its id and how it is shown in a list prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: i64,
    pub label: String,
}

/// Turn listing rows into prompt choices for `kind`
pub fn choices(rows: &ResultSet, kind: EntityKind) -> Result<Vec<Choice>> {
    (0..rows.len())
        .map(|row| {
            let id = rows.value(row, "id").and_then(serde_json::Value::as_i64).ok_or_else(|| {
                RosterError::validation(format!("Row {row} has no integer 'id' column"))
            })?;
            let text = |column: &str| rows.value(row, column).map(display_value).unwrap_or_default();
            let label = match kind {
                EntityKind::Department => text("name"),
                EntityKind::Role => text("title"),
                EntityKind::Employee => format!("{} {}", text("first_name"), text("last_name")),
            };
            Ok(Choice { id, label })
        })
        .collect()
}

/// Listing query that yields every entity of `kind`
#[must_use]
pub const fn list_query(kind: EntityKind) -> ListQuery {
    match kind {
        EntityKind::Department => ListQuery::Departments,
        EntityKind::Role => ListQuery::Roles,
        EntityKind::Employee => ListQuery::Employees,
    }
}

/// Menu loop over a store and a console
pub struct MenuCoordinator<'a, S, C> {
    store: &'a S,
    console: &'a mut C,
    workflow: DeletionWorkflow<'static>,
}

impl<'a, S: Store, C: Console> MenuCoordinator<'a, S, C> {
    pub fn new(store: &'a S, console: &'a mut C) -> Self {
        Self { store, console, workflow: DeletionWorkflow::default() }
    }

    /// Use `table` instead of the built-in dependency table.
    ///
    /// The table is checked when the loop starts.
    #[must_use]
    pub fn with_dependencies(mut self, table: &'static [DependencyEdge]) -> Self {
        self.workflow = DeletionWorkflow::new(table);
        self
    }

    /// Run until the user quits or the console stops answering
    pub async fn run(&mut self) -> Result<()> {
        validate_edges(self.workflow.table())?;
        let labels: Vec<String> = MENU.iter().map(|(_, label)| (*label).to_string()).collect();

        loop {
            let picked = self.console.select("What would you like to do?", &labels)?;
            let (action, _) = MENU
                .get(picked)
                .ok_or_else(|| RosterError::validation(format!("No menu entry {picked}")))?;

            if self.dispatch(*action).await? == Flow::Quit {
                return Ok(());
            }
        }
    }

    /// Run one action, reporting its failure on the console.
    ///
    /// Only fatal errors are returned.
    pub async fn dispatch(&mut self, action: MenuAction) -> Result<Flow> {
        tracing::debug!(action = action.label(), "Menu action");

        match self.perform(action).await {
            Ok(flow) => Ok(flow),
            Err(err) if err.is_fatal() => Err(err),
            Err(err @ RosterError::NotFound(_)) => {
                self.console.show(&Message::warning(err.message()));
                Ok(Flow::Continue)
            }
            Err(err) => {
                tracing::warn!(action = action.label(), error = %err, "Menu action failed");
                self.console.show(&Message::from_error(&err));
                Ok(Flow::Continue)
            }
        }
    }

    async fn perform(&mut self, action: MenuAction) -> Result<Flow> {
        match action {
            MenuAction::ViewDepartments => self.show_list(ListQuery::Departments).await?,
            MenuAction::ViewRoles => self.show_list(ListQuery::Roles).await?,
            MenuAction::ViewEmployees => self.show_list(ListQuery::Employees).await?,
            MenuAction::ViewEmployeesByManager => self.view_employees_by_manager().await?,
            MenuAction::AddDepartment => self.add_department().await?,
            MenuAction::AddRole => self.add_role().await?,
            MenuAction::AddEmployee => self.add_employee().await?,
            MenuAction::UpdateEmployeeRole => self.update_employee_role().await?,
            MenuAction::DeleteDepartment => self.delete(EntityKind::Department).await?,
            MenuAction::DeleteRole => self.delete(EntityKind::Role).await?,
            MenuAction::DeleteEmployee => self.delete(EntityKind::Employee).await?,
            MenuAction::Quit => {
                self.console.show(&Message::info("Goodbye!"));
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    async fn show_list(&mut self, query: ListQuery) -> Result<()> {
        let rows = self.store.fetch(query).await?;
        self.console.print(&render(&rows));
        Ok(())
    }

    /// Fetch the choices for `kind`, or `None` after telling the user there are none
    async fn fetch_choices(&mut self, query: ListQuery, kind: EntityKind) -> Result<Option<Vec<Choice>>> {
        let list = choices(&self.store.fetch(query).await?, kind)?;
        if list.is_empty() {
            let what = if query == ListQuery::Managers { "managers" } else { kind.plural() };
            self.console.show(&Message::info(format!("No {what} found.")));
            return Ok(None);
        }
        Ok(Some(list))
    }

    fn pick(&mut self, prompt: &str, list: &[Choice]) -> Result<i64> {
        let labels: Vec<String> = list.iter().map(|c| c.label.clone()).collect();
        let idx = self.console.select(prompt, &labels)?;
        list.get(idx)
            .map(|c| c.id)
            .ok_or_else(|| RosterError::validation(format!("No choice {idx}")))
    }

    fn required_input(&mut self, prompt: &str, field: &str) -> Result<String> {
        let value = self.console.input(prompt)?.trim().to_string();
        if value.is_empty() {
            return Err(RosterError::validation(format!("{field} cannot be empty")));
        }
        Ok(value)
    }

    async fn view_employees_by_manager(&mut self) -> Result<()> {
        let Some(managers) = self.fetch_choices(ListQuery::Managers, EntityKind::Employee).await?
        else {
            return Ok(());
        };
        let manager_id = self.pick("Whose reports do you want to see?", &managers)?;
        self.show_list(ListQuery::EmployeesByManager(manager_id)).await
    }

    async fn add_department(&mut self) -> Result<()> {
        let name = self.required_input("What is the name of the department?", "Department name")?;
        self.store.add_department(&name).await?;
        self.console.show(&Message::success(format!("Added {name} to the database")));
        Ok(())
    }

    async fn add_role(&mut self) -> Result<()> {
        let Some(departments) =
            self.fetch_choices(ListQuery::Departments, EntityKind::Department).await?
        else {
            return Ok(());
        };

        let title = self.required_input("What is the name of the role?", "Role title")?;
        let salary = parse_salary(&self.console.input("What is the salary of the role?")?)?;
        let department_id = self.pick("Which department does the role belong to?", &departments)?;

        self.store.add_role(&NewRole { title: title.clone(), salary, department_id }).await?;
        self.console.show(&Message::success(format!("Added {title} to the database")));
        Ok(())
    }

    async fn add_employee(&mut self) -> Result<()> {
        let Some(roles) = self.fetch_choices(ListQuery::Roles, EntityKind::Role).await? else {
            return Ok(());
        };
        let employees = choices(&self.store.fetch(ListQuery::Employees).await?, EntityKind::Employee)?;

        let first_name = self.required_input("What is the employee's first name?", "First name")?;
        let last_name = self.required_input("What is the employee's last name?", "Last name")?;
        let role_id = self.pick("What is the employee's role?", &roles)?;

        let mut labels = vec!["None".to_string()];
        labels.extend(employees.iter().map(|c| c.label.clone()));
        let picked = self.console.select("Who is the employee's manager?", &labels)?;
        let manager_id = match picked {
            0 => None,
            n => Some(
                employees
                    .get(n - 1)
                    .map(|c| c.id)
                    .ok_or_else(|| RosterError::validation(format!("No choice {n}")))?,
            ),
        };

        let employee = NewEmployee { first_name, last_name, role_id, manager_id };
        self.store.add_employee(&employee).await?;
        self.console.show(&Message::success(format!(
            "Added {} {} to the database",
            employee.first_name, employee.last_name
        )));
        Ok(())
    }

    async fn update_employee_role(&mut self) -> Result<()> {
        let Some(employees) = self.fetch_choices(ListQuery::Employees, EntityKind::Employee).await?
        else {
            return Ok(());
        };
        let Some(roles) = self.fetch_choices(ListQuery::Roles, EntityKind::Role).await? else {
            return Ok(());
        };

        let employee_id = self.pick("Which employee's role do you want to update?", &employees)?;
        let role_id = self.pick("Which role do you want to assign the selected employee?", &roles)?;

        if self.store.update_employee_role(employee_id, role_id).await? == 0 {
            return Err(RosterError::not_found(format!("Employee #{employee_id}")));
        }
        self.console.show(&Message::success("Updated employee's role"));
        Ok(())
    }

    async fn delete(&mut self, kind: EntityKind) -> Result<()> {
        let Some(targets) = self.fetch_choices(list_query(kind), kind).await? else {
            return Ok(());
        };
        let id = self.pick(&format!("Which {kind} do you want to delete?"), &targets)?;

        match self.workflow.run(self.store, &mut *self.console, kind, id).await {
            DeletionOutcome::Error(err) if err.is_fatal() => Err(err),
            outcome => {
                self.console.show(&outcome.message());
                Ok(())
            }
        }
    }
}

/// Parse a salary entered at the prompt
pub fn parse_salary(input: &str) -> Result<f64> {
    match input.trim().parse::<f64>() {
        Ok(salary) if salary.is_finite() && salary >= 0.0 => Ok(salary),
        _ => Err(RosterError::validation(format!(
            "Salary must be a non-negative number, got '{}'",
            input.trim()
        ))),
    }
}
