#![allow(dead_code)]

//! Scripted in-memory `DocumentContainer` for exercising the seeder and
//! harness without a live account.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use rubench::container::{DocumentContainer, PointRead, QueryPage, WriteOutcome};
use rubench::error::{Result, RubenchError};

/// How `create_item` behaves, per document, across attempts.
pub enum WriteScript {
    /// Every write succeeds on the first attempt.
    Succeed,
    /// Each document is throttled for its first N attempts, then succeeds.
    ThrottleFirst(u32),
    /// Every attempt is throttled.
    AlwaysThrottle,
    /// Writes succeed except the one with this id, which fails fatally.
    FailOn(&'static str),
}

pub struct ScriptedContainer {
    write_script: WriteScript,
    attempts: Mutex<HashMap<String, u32>>,
    created: Mutex<Vec<String>>,
    pages: Vec<(Vec<Value>, f64)>,
    point_read: Option<(Value, f64)>,
}

impl ScriptedContainer {
    pub fn new(write_script: WriteScript) -> Self {
        ScriptedContainer {
            write_script,
            attempts: Mutex::new(HashMap::new()),
            created: Mutex::new(Vec::new()),
            pages: Vec::new(),
            point_read: None,
        }
    }

    /// Container whose queries serve these pages in order, as (rows, charge).
    pub fn with_pages(pages: Vec<(Vec<Value>, f64)>) -> Self {
        ScriptedContainer {
            pages,
            ..ScriptedContainer::new(WriteScript::Succeed)
        }
    }

    pub fn point_read(mut self, document: Value, charge: f64) -> Self {
        self.point_read = Some((document, charge));
        self
    }

    /// Highest attempt count over all documents, i.e. the number of waves
    /// the slowest document went through.
    pub fn max_attempts(&self) -> u32 {
        self.attempts
            .lock()
            .unwrap()
            .values()
            .copied()
            .max()
            .unwrap_or(0)
    }

    pub fn attempted_ids(&self) -> Vec<String> {
        self.attempts.lock().unwrap().keys().cloned().collect()
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentContainer for ScriptedContainer {
    async fn create_item(&self, body: &Value, _partition_key: &str) -> Result<WriteOutcome> {
        let id = body
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let count = attempts.entry(id.clone()).or_insert(0);
            *count += 1;
            *count
        };

        let created = |this: &Self| {
            this.created.lock().unwrap().push(id.clone());
            Ok(WriteOutcome::Created { charge: 5.0 })
        };
        match &self.write_script {
            WriteScript::Succeed => created(self),
            WriteScript::ThrottleFirst(n) if attempt <= *n => Ok(WriteOutcome::Throttled),
            WriteScript::ThrottleFirst(_) => created(self),
            WriteScript::AlwaysThrottle => Ok(WriteOutcome::Throttled),
            WriteScript::FailOn(bad) if id == *bad => Err(RubenchError::Unexpected {
                status: 409,
                body: "conflict".to_string(),
            }),
            WriteScript::FailOn(_) => created(self),
        }
    }

    async fn read_item(&self, _id: &str, _partition_key: &str) -> Result<Option<PointRead>> {
        Ok(self
            .point_read
            .as_ref()
            .map(|(document, charge)| PointRead {
                document: document.clone(),
                charge: *charge,
            }))
    }

    async fn query_page(&self, _query: &str, continuation: Option<&str>) -> Result<QueryPage> {
        let index: usize = continuation.map(|c| c.parse().unwrap()).unwrap_or(0);
        let (rows, charge) = self.pages.get(index).cloned().unwrap_or((Vec::new(), 0.0));
        let continuation = (index + 1 < self.pages.len()).then(|| (index + 1).to_string());
        Ok(QueryPage {
            rows,
            charge,
            continuation,
        })
    }
}
