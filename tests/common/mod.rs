//! Shared test doubles: an in-memory store with scripted lookups and a
//! console that answers from a script and records what it was shown.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use roster::{
    Console, EntityKind, ListQuery, Message, MessageClass, NewEmployee, NewRole, Relation,
    ResultSet, RosterError, Store,
};

#[derive(Default)]
struct FakeState {
    dependents: HashMap<(Relation, i64), usize>,
    failing_lookup: Option<Relation>,
    delete_result: u64,
    update_result: u64,
    lookups: Vec<(Relation, i64)>,
    deletes: Vec<(EntityKind, i64)>,
    listings: Vec<(ListQuery, ResultSet)>,
}

/// Store fake driven entirely by what the test configures
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<FakeState>,
}

impl FakeStore {
    pub fn new() -> Self {
        let store = Self::default();
        {
            let mut state = store.state.lock().unwrap();
            state.delete_result = 1;
            state.update_result = 1;
        }
        store
    }

    /// `count` rows depend on `parent_id` through `relation`
    pub fn with_dependents(self, relation: Relation, parent_id: i64, count: usize) -> Self {
        self.state.lock().unwrap().dependents.insert((relation, parent_id), count);
        self
    }

    /// Lookups through `relation` fail with a data-access error
    pub fn failing_lookup(self, relation: Relation) -> Self {
        self.state.lock().unwrap().failing_lookup = Some(relation);
        self
    }

    /// Rows reported as affected by `delete_entity`
    pub fn deleting(self, affected: u64) -> Self {
        self.state.lock().unwrap().delete_result = affected;
        self
    }

    /// Rows reported as affected by `update_employee_role`
    pub fn updating(self, affected: u64) -> Self {
        self.state.lock().unwrap().update_result = affected;
        self
    }

    pub fn with_listing(self, query: ListQuery, rows: ResultSet) -> Self {
        self.state.lock().unwrap().listings.push((query, rows));
        self
    }

    pub fn deletes(&self) -> Vec<(EntityKind, i64)> {
        self.state.lock().unwrap().deletes.clone()
    }

    pub fn lookups(&self) -> Vec<(Relation, i64)> {
        self.state.lock().unwrap().lookups.clone()
    }
}

impl Store for FakeStore {
    async fn init_schema(&self) -> roster::Result<()> {
        Ok(())
    }

    async fn seed(&self) -> roster::Result<()> {
        Ok(())
    }

    async fn fetch(&self, query: ListQuery) -> roster::Result<ResultSet> {
        let state = self.state.lock().unwrap();
        state
            .listings
            .iter()
            .find(|(q, _)| *q == query)
            .map(|(_, rows)| rows.clone())
            .ok_or_else(|| RosterError::data_access(format!("No listing scripted for {query:?}")))
    }

    async fn add_department(&self, _name: &str) -> roster::Result<()> {
        Ok(())
    }

    async fn add_role(&self, _role: &NewRole) -> roster::Result<()> {
        Ok(())
    }

    async fn add_employee(&self, _employee: &NewEmployee) -> roster::Result<()> {
        Ok(())
    }

    async fn update_employee_role(&self, _employee_id: i64, _role_id: i64) -> roster::Result<u64> {
        Ok(self.state.lock().unwrap().update_result)
    }

    async fn lookup_dependents(
        &self,
        relation: Relation,
        parent_id: i64,
    ) -> roster::Result<ResultSet> {
        let mut state = self.state.lock().unwrap();
        state.lookups.push((relation, parent_id));

        if state.failing_lookup == Some(relation) {
            return Err(RosterError::data_access("connection reset"));
        }

        let count = state.dependents.get(&(relation, parent_id)).copied().unwrap_or(0);
        let mut rows = ResultSet::new(["id"])?;
        for i in 0..count {
            rows.push_row(vec![serde_json::json!(i + 100)])?;
        }
        Ok(rows)
    }

    async fn delete_entity(&self, kind: EntityKind, id: i64) -> roster::Result<u64> {
        let mut state = self.state.lock().unwrap();
        state.deletes.push((kind, id));
        Ok(state.delete_result)
    }
}

/// Console answering from queued responses
///
/// Running out of scripted answers fails like a closed terminal.
#[derive(Default)]
pub struct ScriptedConsole {
    selects: VecDeque<usize>,
    inputs: VecDeque<String>,
    confirms: VecDeque<bool>,
    pub select_prompts: Vec<(String, Vec<String>)>,
    pub confirm_prompts: Vec<String>,
    pub shown: Vec<Message>,
    pub printed: Vec<String>,
}

impl ScriptedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_select(mut self, index: usize) -> Self {
        self.selects.push_back(index);
        self
    }

    pub fn then_input(mut self, text: &str) -> Self {
        self.inputs.push_back(text.to_string());
        self
    }

    pub fn then_confirm(mut self, answer: bool) -> Self {
        self.confirms.push_back(answer);
        self
    }

    /// Text of every shown message of `class`
    pub fn shown_of(&self, class: MessageClass) -> Vec<String> {
        self.shown.iter().filter(|m| m.class == class).map(|m| m.text.clone()).collect()
    }

    /// Everything shown or printed, in display form
    pub fn transcript(&self) -> String {
        let mut lines: Vec<String> = self.printed.clone();
        lines.extend(self.shown.iter().map(ToString::to_string));
        lines.join("\n")
    }
}

impl Console for ScriptedConsole {
    fn select(&mut self, prompt: &str, items: &[String]) -> roster::Result<usize> {
        self.select_prompts.push((prompt.to_string(), items.to_vec()));
        self.selects.pop_front().ok_or_else(|| RosterError::prompt("no scripted selection"))
    }

    fn input(&mut self, _prompt: &str) -> roster::Result<String> {
        self.inputs.pop_front().ok_or_else(|| RosterError::prompt("no scripted input"))
    }

    fn confirm(&mut self, prompt: &str) -> roster::Result<bool> {
        self.confirm_prompts.push(prompt.to_string());
        self.confirms.pop_front().ok_or_else(|| RosterError::prompt("no scripted answer"))
    }

    fn show(&mut self, message: &Message) {
        self.shown.push(message.clone());
    }

    fn print(&mut self, text: &str) {
        self.printed.push(text.to_string());
    }
}
