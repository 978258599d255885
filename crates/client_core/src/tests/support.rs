//! Shared fixtures: an in-process studies backend, a recording resource and a
//! scripted prompter.

use std::{
    collections::VecDeque,
    io,
    sync::{Arc, Mutex as StdMutex},
};

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use shared::{
    domain::{Study, StudyId},
    error::ApiError,
};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{error::ResourceError, prompt::Prompter, resource::StudyResource};

pub fn study(id: &str, studyname: &str, description: &str) -> Study {
    Study {
        id: Some(StudyId::new(id)),
        studyname: studyname.to_string(),
        description: description.to_string(),
        ..Study::default()
    }
}

#[derive(Clone, Default)]
pub struct BackendState {
    pub studies: Arc<Mutex<Vec<Study>>>,
    pub requests: Arc<Mutex<Vec<(Method, String)>>>,
    pub bodies: Arc<Mutex<Vec<Study>>>,
    pub fail_list: Arc<Mutex<bool>>,
    next_id: Arc<Mutex<u64>>,
}

impl BackendState {
    async fn record(&self, method: Method, path: String) {
        self.requests.lock().await.push((method, path));
    }
}

fn not_found(id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(format!("Could not find study {id}"))),
    )
        .into_response()
}

async fn list_studies(State(state): State<BackendState>) -> Response {
    state.record(Method::GET, "/studies".into()).await;
    if *state.fail_list.lock().await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new("database offline")),
        )
            .into_response();
    }
    Json(state.studies.lock().await.clone()).into_response()
}

async fn create_study(
    State(state): State<BackendState>,
    Json(mut payload): Json<Study>,
) -> Response {
    state.record(Method::POST, "/studies".into()).await;
    state.bodies.lock().await.push(payload.clone());
    if payload.id.is_none() {
        let mut next_id = state.next_id.lock().await;
        *next_id += 1;
        payload.id = Some(StudyId::new(format!("{:024x}", *next_id)));
    }
    upsert(&state, payload.clone()).await;
    Json(payload).into_response()
}

async fn get_study(State(state): State<BackendState>, Path(id): Path<String>) -> Response {
    state.record(Method::GET, format!("/studies/{id}")).await;
    let studies = state.studies.lock().await;
    match studies
        .iter()
        .find(|study| study.id.as_ref().map(StudyId::as_str) == Some(id.as_str()))
    {
        Some(study) => Json(study.clone()).into_response(),
        None => not_found(&id),
    }
}

async fn update_study(
    State(state): State<BackendState>,
    Path(id): Path<String>,
    Json(mut payload): Json<Study>,
) -> Response {
    state.record(Method::POST, format!("/studies/{id}")).await;
    state.bodies.lock().await.push(payload.clone());
    payload.id = Some(StudyId::new(id));
    upsert(&state, payload.clone()).await;
    Json(payload).into_response()
}

async fn delete_study(State(state): State<BackendState>, Path(id): Path<String>) -> Response {
    state.record(Method::DELETE, format!("/studies/{id}")).await;
    state
        .studies
        .lock()
        .await
        .retain(|study| study.id.as_ref().map(StudyId::as_str) != Some(id.as_str()));
    Json(serde_json::json!({})).into_response()
}

async fn upsert(state: &BackendState, study: Study) {
    let mut studies = state.studies.lock().await;
    match studies.iter_mut().find(|existing| existing.id == study.id) {
        Some(existing) => *existing = study,
        None => studies.push(study),
    }
}

pub async fn spawn_studies_server(
    seed: Vec<Study>,
) -> Result<(String, BackendState), Box<dyn std::error::Error>> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = BackendState::default();
    *state.studies.lock().await = seed;

    let app = Router::new()
        .route("/studies", get(list_studies).post(create_study))
        .route(
            "/studies/:id",
            get(get_study).post(update_study).delete(delete_study),
        )
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Query,
    Get(StudyId),
    Save(Study),
    Delete(StudyId),
}

/// In-memory resource that records every call in order.
#[derive(Clone, Default)]
pub struct RecordingResource {
    pub studies: Arc<StdMutex<Vec<Study>>>,
    pub calls: Arc<StdMutex<Vec<Call>>>,
    pub fail_query: Arc<StdMutex<Option<String>>>,
    pub fail_mutations: Arc<StdMutex<Option<String>>>,
}

impl RecordingResource {
    pub fn with_studies(studies: Vec<Study>) -> Self {
        let resource = Self::default();
        *resource.studies.lock().expect("studies") = studies;
        resource
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls").clone()
    }

    fn push(&self, call: Call) {
        self.calls.lock().expect("calls").push(call);
    }

    fn mutation_failure(&self) -> Result<(), ResourceError> {
        match self.fail_mutations.lock().expect("fail").clone() {
            Some(payload) => Err(ResourceError::Status {
                status: reqwest::StatusCode::BAD_REQUEST,
                payload,
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StudyResource for RecordingResource {
    async fn query(&self) -> Result<Vec<Study>, ResourceError> {
        self.push(Call::Query);
        if let Some(payload) = self.fail_query.lock().expect("fail").clone() {
            return Err(ResourceError::Status {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                payload,
            });
        }
        Ok(self.studies.lock().expect("studies").clone())
    }

    async fn get(&self, id: &StudyId) -> Result<Study, ResourceError> {
        self.push(Call::Get(id.clone()));
        self.studies
            .lock()
            .expect("studies")
            .iter()
            .find(|study| study.id.as_ref() == Some(id))
            .cloned()
            .ok_or(ResourceError::Status {
                status: reqwest::StatusCode::NOT_FOUND,
                payload: format!("Could not find study {id}"),
            })
    }

    async fn save(&self, study: &Study) -> Result<Study, ResourceError> {
        self.push(Call::Save(study.clone()));
        self.mutation_failure()?;

        let mut studies = self.studies.lock().expect("studies");
        let mut saved = study.clone();
        match saved.id.clone() {
            Some(id) => {
                if let Some(existing) = studies.iter_mut().find(|s| s.id.as_ref() == Some(&id)) {
                    *existing = saved.clone();
                }
            }
            None => {
                saved.id = Some(StudyId::new(format!("new-{}", studies.len() + 1)));
                studies.push(saved.clone());
            }
        }
        Ok(saved)
    }

    async fn delete(&self, id: &StudyId) -> Result<(), ResourceError> {
        self.push(Call::Delete(id.clone()));
        self.mutation_failure()?;
        self.studies
            .lock()
            .expect("studies")
            .retain(|study| study.id.as_ref() != Some(id));
        Ok(())
    }
}

/// Answers prompts from a queue; `None` entries and an exhausted queue cancel.
/// An empty answer takes the pre-filled default.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Option<String>>,
    pub prompts: Vec<(String, Option<String>)>,
    pub alerts: Vec<String>,
}

impl ScriptedPrompter {
    pub fn answering(answers: &[Option<&str>]) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|answer| answer.map(str::to_string))
                .collect(),
            ..Self::default()
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&mut self, message: &str, default: Option<&str>) -> io::Result<Option<String>> {
        self.prompts
            .push((message.to_string(), default.map(str::to_string)));
        let answer = self.answers.pop_front().flatten();
        Ok(match (answer, default) {
            (Some(answer), Some(default)) if answer.is_empty() => Some(default.to_string()),
            (answer, _) => answer,
        })
    }

    fn alert(&mut self, message: &str) -> io::Result<()> {
        self.alerts.push(message.to_string());
        Ok(())
    }
}
