//! Shared helpers for integration tests.

#![allow(dead_code)]

use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use toolforge::k8s::types::PipelineRun;
use toolforge::k8s::{K8sError, K8sResult, KubeApi, ObjectKind};

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture(name: &str) -> Value {
    let content = std::fs::read_to_string(fixture_path(name)).unwrap();
    serde_json::from_str(&content).unwrap()
}

pub fn run_fixture(name: &str) -> PipelineRun {
    serde_json::from_value(fixture(name)).unwrap()
}

/// One call made against [`FakeApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get(ObjectKind, String),
    List(ObjectKind, Option<String>),
    Create(ObjectKind),
    Patch(ObjectKind, String, Vec<Value>),
    Delete(ObjectKind, String),
    DeleteAll(ObjectKind, Option<String>),
}

/// In-memory control plane that records every call.
#[derive(Default)]
pub struct FakeApi {
    pub objects: HashMap<(ObjectKind, String), Value>,
    pub listed: Vec<Value>,
    pub created: Option<Value>,
    pub patched: HashMap<String, Value>,
    pub calls: RefCell<Vec<Call>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, kind: ObjectKind, name: &str, object: Value) -> Self {
        self.objects.insert((kind, name.to_string()), object);
        self
    }

    pub fn with_listed(mut self, runs: Vec<Value>) -> Self {
        self.listed = runs;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn gets_of(&self, kind: ObjectKind) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Get(k, name) if k == kind => Some(name),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl KubeApi for FakeApi {
    fn get_object(&self, kind: ObjectKind, name: &str) -> K8sResult<Value> {
        self.record(Call::Get(kind, name.to_string()));
        self.objects
            .get(&(kind, name.to_string()))
            .cloned()
            .ok_or_else(|| K8sError::NotFound {
                kind,
                name: name.to_string(),
            })
    }

    fn get_objects(&self, kind: ObjectKind, selector: Option<&str>) -> K8sResult<Vec<Value>> {
        self.record(Call::List(kind, selector.map(str::to_string)));
        Ok(self.listed.clone())
    }

    fn create_object(&self, kind: ObjectKind, spec: &Value) -> K8sResult<Value> {
        self.record(Call::Create(kind));
        Ok(self.created.clone().unwrap_or_else(|| spec.clone()))
    }

    fn patch_object(&self, kind: ObjectKind, name: &str, patches: &[Value]) -> K8sResult<Value> {
        self.record(Call::Patch(kind, name.to_string(), patches.to_vec()));
        self.patched
            .get(name)
            .cloned()
            .ok_or_else(|| K8sError::NotFound {
                kind,
                name: name.to_string(),
            })
    }

    fn delete_object(&self, kind: ObjectKind, name: &str) -> K8sResult<()> {
        self.record(Call::Delete(kind, name.to_string()));
        Ok(())
    }

    fn delete_objects(&self, kind: ObjectKind, selector: Option<&str>) -> K8sResult<()> {
        self.record(Call::DeleteAll(kind, selector.map(str::to_string)));
        Ok(())
    }
}
