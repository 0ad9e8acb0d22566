use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::cricket::{City, DerivedFeatures, MatchSituation, Team};
use crate::history::{HistoryStore, LoadOutcome, PredictionRecord};
use crate::model::ScoreModel;
use crate::session::{Lifecycle, PredictError, PredictionSummary, ScoreOutlook, SessionState};

/// Session and history for the single user this process serves.
#[derive(Debug)]
pub struct Workspace {
    pub session: SessionState,
    pub history: HistoryStore,
}

pub struct AppState {
    pub workspace: Mutex<Workspace>,
    pub model: Arc<dyn ScoreModel>,
}

impl AppState {
    pub fn new(history: HistoryStore, model: Arc<dyn ScoreModel>) -> Self {
        AppState {
            workspace: Mutex::new(Workspace {
                session: SessionState::new(),
                history,
            }),
            model,
        }
    }
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

/// Everything the page needs to render the session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub lifecycle: Lifecycle,
    pub situation: MatchSituation,
    /// Why no prediction can be made yet, if one cannot
    pub invalid_reason: Option<String>,
    pub features: Option<DerivedFeatures>,
    pub summary: Option<PredictionSummary>,
    pub outlook: Option<ScoreOutlook>,
}

impl SessionSnapshot {
    pub fn of(session: &SessionState) -> Self {
        let features = session.features();
        let summary = session.summary();
        let outlook = match (summary, features) {
            (Some(s), Some(f)) => Some(ScoreOutlook::new(&s, &f, session.situation().current_score)),
            _ => None,
        };
        SessionSnapshot {
            lifecycle: session.lifecycle(),
            situation: session.situation().clone(),
            invalid_reason: session.validity().err().map(|r| r.to_string()),
            features,
            summary,
            outlook,
        }
    }
}

/// One history row, with the compact matchup label the list shows
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub record: PredictionRecord,
    /// e.g. "Pak v New"
    pub matchup: String,
}

impl From<&PredictionRecord> for HistoryEntry {
    fn from(record: &PredictionRecord) -> Self {
        HistoryEntry {
            matchup: format!(
                "{} v {}",
                record.batting_team.short_name(),
                record.bowling_team.short_name()
            ),
            record: record.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    pub capacity: usize,
    pub last_load: LoadOutcome,
    pub entries: Vec<HistoryEntry>,
}

impl HistoryView {
    fn of(history: &HistoryStore) -> Self {
        HistoryView {
            capacity: history.log().capacity(),
            last_load: history.last_load().clone(),
            entries: history.log().iter().map(HistoryEntry::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Options {
    pub teams: Vec<&'static str>,
    pub cities: Vec<&'static str>,
}

/// Build the Axum router for the dashboard.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/options", get(options_handler))
        .route("/api/session", get(session_handler).put(update_session_handler))
        .route("/api/predict", post(predict_handler))
        .route("/api/reset", post(reset_handler))
        .route("/api/history", get(history_handler).delete(clear_history_handler))
        .route("/api/history/:index/load", post(load_history_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

async fn index_handler() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}

/// GET /api/options
async fn options_handler() -> Json<Options> {
    Json(Options {
        teams: Team::ALL.iter().map(|t| t.name()).collect(),
        cities: City::ALL.iter().map(|c| c.name()).collect(),
    })
}

/// GET /api/session
async fn session_handler(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    let ws = state.workspace.lock().await;
    Json(SessionSnapshot::of(&ws.session))
}

/// PUT /api/session
async fn update_session_handler(
    State(state): State<Arc<AppState>>,
    Json(situation): Json<MatchSituation>,
) -> Json<SessionSnapshot> {
    let mut ws = state.workspace.lock().await;
    ws.session.replace_situation(situation);
    Json(SessionSnapshot::of(&ws.session))
}

/// POST /api/predict
async fn predict_handler(State(state): State<Arc<AppState>>) -> ApiResult<SessionSnapshot> {
    let mut guard = state.workspace.lock().await;
    let ws = &mut *guard;
    match ws.session.predict(state.model.as_ref(), &mut ws.history).await {
        Ok(_) => Ok(Json(SessionSnapshot::of(&ws.session))),
        Err(PredictError::InvalidSituation(reason)) => {
            Err((StatusCode::UNPROCESSABLE_ENTITY, reason.to_string()))
        }
        Err(e @ PredictError::Model(_)) => {
            warn!("Prediction failed ({}): {}", state.model.name(), e);
            Err((StatusCode::BAD_GATEWAY, e.to_string()))
        }
    }
}

/// POST /api/reset
async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    let mut ws = state.workspace.lock().await;
    ws.session.reset();
    Json(SessionSnapshot::of(&ws.session))
}

/// GET /api/history
async fn history_handler(State(state): State<Arc<AppState>>) -> Json<HistoryView> {
    let ws = state.workspace.lock().await;
    Json(HistoryView::of(&ws.history))
}

/// DELETE /api/history
async fn clear_history_handler(State(state): State<Arc<AppState>>) -> Json<HistoryView> {
    let mut ws = state.workspace.lock().await;
    ws.history.clear();
    Json(HistoryView::of(&ws.history))
}

/// POST /api/history/:index/load
async fn load_history_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> ApiResult<SessionSnapshot> {
    let mut guard = state.workspace.lock().await;
    let ws = &mut *guard;
    ws.session
        .load_history_entry(&ws.history, index)
        .map_err(|e| (StatusCode::NOT_FOUND, e.to_string()))?;
    Ok(Json(SessionSnapshot::of(&ws.session)))
}

/// Embedded single-file dashboard (HTML + CSS + JS)
const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>T20 Score Predictor</title>
<style>
  :root { --bg: #0f172a; --card: #1e293b; --border: #334155; --green: #10b981; --gold: #fbbf24; --text: #e2e8f0; --muted: #94a3b8; --red: #ef4444; }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { padding: 1rem 2rem; background: linear-gradient(135deg, #059669, #047857); }
  header h1 { font-size: 1.4rem; }
  header p { font-size: .8rem; color: #a7f3d0; }
  main { display: grid; grid-template-columns: 1.2fr 1.3fr .8fr; gap: 1.2rem; padding: 1.2rem 2rem; }
  @media (max-width: 900px) { main { grid-template-columns: 1fr; } }
  .card { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1rem; margin-bottom: 1rem; }
  .card h2 { font-size: .75rem; color: var(--muted); text-transform: uppercase; letter-spacing: .06em; margin-bottom: .6rem; }
  label { display: block; font-size: .75rem; color: var(--muted); margin: .4rem 0 .2rem; }
  select, input { width: 100%; padding: .4rem; background: var(--bg); color: var(--text); border: 1px solid var(--border); border-radius: 6px; }
  .row { display: grid; grid-template-columns: 1fr 1fr; gap: .6rem; }
  button { padding: .5rem 1rem; border: none; border-radius: 6px; background: #059669; color: #fff; font-weight: 600; cursor: pointer; width: 100%; }
  button.secondary { background: var(--border); }
  .empty { color: var(--muted); text-align: center; padding: 2rem; }
  .score { font-size: 2.4rem; font-weight: 700; color: var(--green); text-align: center; }
  .prediction { border: 2px solid var(--gold); border-radius: 10px; padding: 1rem; text-align: center; }
  .prediction .value { font-size: 2.8rem; font-weight: 700; color: var(--gold); }
  .stats { display: grid; grid-template-columns: repeat(3, 1fr); gap: .6rem; margin-top: .8rem; text-align: center; }
  .stats div span { display: block; font-size: 1.2rem; color: var(--green); font-weight: 600; }
  .stats div small { font-size: .65rem; color: var(--muted); text-transform: uppercase; }
  .hist { display: flex; justify-content: space-between; align-items: center; gap: .5rem; padding: .4rem 0; border-bottom: 1px solid var(--border); font-size: .85rem; }
  .hist button { width: auto; padding: .2rem .6rem; font-size: .75rem; }
  .error { color: var(--red); font-size: .8rem; margin-top: .5rem; min-height: 1rem; }
</style>
</head>
<body>
<header><h1>T20 Score Predictor</h1><p>Projected final innings total from the current match situation</p></header>
<main>
  <section>
    <div class="card">
      <h2>Match Setup</h2>
      <div class="row">
        <div><label>Batting</label><select id="batting_team"></select></div>
        <div><label>Bowling</label><select id="bowling_team"></select></div>
      </div>
      <label>Venue</label><select id="city"></select>
    </div>
    <div class="card">
      <h2>Current Situation</h2>
      <div class="row">
        <div><label>Score</label><input id="current_score" type="number" min="0" max="400"></div>
        <div><label>Overs</label><input id="overs" type="number" min="5" max="20" step="0.1"></div>
        <div><label>Wickets</label><input id="wickets" type="number" min="0" max="10"></div>
        <div><label>Last 5 Overs</label><input id="last_five" type="number" min="0" max="120"></div>
      </div>
    </div>
    <div class="row">
      <button onclick="predict()">Predict Score</button>
      <button class="secondary" onclick="post('/api/reset').then(render)">Clear</button>
    </div>
    <p class="error" id="error"></p>
  </section>
  <section id="result"></section>
  <section>
    <div class="card">
      <h2>Recent Predictions</h2>
      <button class="secondary" onclick="clearHistory()">Clear History</button>
      <div id="history"></div>
    </div>
  </section>
</main>
<script>
const FIELDS = ['batting_team', 'bowling_team', 'city', 'current_score', 'overs', 'wickets', 'last_five'];
const $ = id => document.getElementById(id);

async function call(method, url, body) {
  const res = await fetch(url, { method, headers: { 'Content-Type': 'application/json' }, body: body && JSON.stringify(body) });
  if (!res.ok) throw new Error(await res.text());
  return res.json();
}
const post = url => call('POST', url);

function fill(id, names) {
  $(id).innerHTML = '<option value="">-- Select --</option>' + names.map(n => `<option>${n}</option>`).join('');
}

function readSituation() {
  const pick = id => $(id).value || null;
  const num = id => Number($(id).value) || 0;
  return {
    batting_team: pick('batting_team'), bowling_team: pick('bowling_team'), city: pick('city'),
    current_score: Math.trunc(num('current_score')), overs: num('overs'),
    wickets: Math.trunc(num('wickets')), last_five: Math.trunc(num('last_five')),
  };
}

function render(snap) {
  const s = snap.situation;
  FIELDS.forEach(f => { $(f).value = s[f] ?? ''; });
  $('error').textContent = '';
  const out = $('result');
  if (snap.lifecycle.state === 'empty') {
    out.innerHTML = `<div class="card empty">Select teams, venue and enter match details<br><small>${snap.invalid_reason || ''}</small></div>`;
    return;
  }
  const f = snap.features;
  let html = `<div class="card"><h2>${s.batting_team} vs ${s.bowling_team} · ${s.city}</h2>
    <div class="score">${s.current_score}/${s.wickets}</div>
    <p style="text-align:center;color:var(--muted)">${s.overs} overs · Run Rate ${f.current_run_rate.toFixed(2)}</p></div>`;
  if (snap.summary) {
    const p = snap.summary, o = snap.outlook;
    html += `<div class="prediction"><h2>Predicted Final Score</h2><div class="value">${p.predicted_score}</div>
      <p>+${p.runs_to_add} runs · RRR ${p.required_rate.toFixed(2)}</p></div>
      <div class="card stats">
        <div><span>${f.balls_left}</span><small>Balls left</small></div>
        <div><span>${f.wickets_left}</span><small>Wickets in hand</small></div>
        <div><span>${o.percent_complete}%</span><small>Complete</small></div>
        <div><span>${o.conservative}</span><small>Conservative</small></div>
        <div><span>${o.aggressive}</span><small>Aggressive</small></div>
        <div><span>${o.chase_confidence}%</span><small>Chase confidence</small></div>
      </div>`;
  } else {
    html += '<div class="card empty">Click <strong>Predict Score</strong> to see results</div>';
  }
  out.innerHTML = html;
}

function renderHistory(view) {
  const el = $('history');
  if (!view.entries.length) { el.innerHTML = '<p class="empty">No history yet</p>'; return; }
  el.innerHTML = view.entries.map((e, i) => `<div class="hist">
      <span>${e.matchup} · ${e.current_score}/${e.wickets} (${e.overs})</span>
      <strong style="color:var(--gold)">${e.predicted_score}</strong>
      <button onclick="loadEntry(${i})">Load</button></div>`).join('');
}

async function refreshHistory() { renderHistory(await call('GET', '/api/history')); }

async function update() {
  try { render(await call('PUT', '/api/session', readSituation())); }
  catch (e) { $('error').textContent = e.message; }
}

async function predict() {
  try { render(await post('/api/predict')); await refreshHistory(); }
  catch (e) { $('error').textContent = e.message; }
}

async function loadEntry(i) {
  try { render(await post(`/api/history/${i}/load`)); }
  catch (e) { $('error').textContent = e.message; await refreshHistory(); }
}

async function clearHistory() { renderHistory(await call('DELETE', '/api/history')); }

(async () => {
  const opts = await call('GET', '/api/options');
  fill('batting_team', opts.teams); fill('bowling_team', opts.teams); fill('city', opts.cities);
  FIELDS.forEach(f => $(f).addEventListener('change', update));
  render(await call('GET', '/api/session'));
  await refreshHistory();
})();
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cricket::FeatureRow;
    use crate::history::HISTORY_CAPACITY;
    use crate::model::{ModelError, RunRateProjection};
    use async_trait::async_trait;
    use tempfile::{tempdir, TempDir};

    struct Unreachable;

    #[async_trait]
    impl ScoreModel for Unreachable {
        fn name(&self) -> &str {
            "unreachable"
        }

        async fn predict(&self, _row: &FeatureRow) -> Result<f64, ModelError> {
            Err(ModelError::Status {
                status: 503,
                body: "down".into(),
            })
        }
    }

    fn app(model: Arc<dyn ScoreModel>) -> (TempDir, Arc<AppState>) {
        let dir = tempdir().unwrap();
        let history = HistoryStore::open(dir.path().join("history.json"), HISTORY_CAPACITY);
        (dir, Arc::new(AppState::new(history, model)))
    }

    fn valid_situation() -> MatchSituation {
        MatchSituation {
            batting_team: Some(Team::Pakistan),
            bowling_team: Some(Team::NewZealand),
            city: Some(City::Lahore),
            current_score: 100,
            overs: 10.0,
            wickets: 3,
            last_five: 50,
        }
    }

    #[tokio::test]
    async fn test_predict_on_empty_session_is_unprocessable() {
        let (_dir, state) = app(Arc::new(RunRateProjection::default()));
        let err = predict_handler(State(state)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_predict_flow_records_history() {
        let (_dir, state) = app(Arc::new(RunRateProjection::default()));
        let Json(snap) =
            update_session_handler(State(state.clone()), Json(valid_situation())).await;
        assert_eq!(snap.lifecycle, Lifecycle::Ready);
        assert!(snap.invalid_reason.is_none());
        assert!(snap.summary.is_none());

        let Json(snap) = predict_handler(State(state.clone())).await.unwrap();
        assert_eq!(snap.lifecycle, Lifecycle::Predicted { predicted_score: 188 });
        let outlook = snap.outlook.unwrap();
        assert_eq!(outlook.conservative, 172);

        let Json(view) = history_handler(State(state.clone())).await;
        assert_eq!(view.entries.len(), 1);
        assert_eq!(view.entries[0].matchup, "Pak v New");
        assert_eq!(view.entries[0].record.predicted_score, 188);
        assert_eq!(view.capacity, HISTORY_CAPACITY);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["entries"][0]["matchup"], "Pak v New");
        assert_eq!(json["entries"][0]["batting_team"], "Pakistan");
    }

    #[tokio::test]
    async fn test_model_failure_is_bad_gateway() {
        let (_dir, state) = app(Arc::new(Unreachable));
        update_session_handler(State(state.clone()), Json(valid_situation())).await;
        let err = predict_handler(State(state.clone())).await.unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_GATEWAY);

        let Json(snap) = session_handler(State(state)).await;
        assert_eq!(snap.lifecycle, Lifecycle::Ready);
    }

    #[tokio::test]
    async fn test_stale_history_index_is_not_found() {
        let (_dir, state) = app(Arc::new(RunRateProjection::default()));
        update_session_handler(State(state.clone()), Json(valid_situation())).await;
        predict_handler(State(state.clone())).await.unwrap();
        clear_history_handler(State(state.clone())).await;

        let err = load_history_handler(State(state), Path(0)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reset_then_load_restores_prediction() {
        let (_dir, state) = app(Arc::new(RunRateProjection::default()));
        update_session_handler(State(state.clone()), Json(valid_situation())).await;
        predict_handler(State(state.clone())).await.unwrap();

        let Json(snap) = reset_handler(State(state.clone())).await;
        assert_eq!(snap.lifecycle, Lifecycle::Empty);
        assert_eq!(snap.invalid_reason.as_deref(), Some("batting team not selected"));

        let Json(snap) = load_history_handler(State(state), Path(0)).await.unwrap();
        assert_eq!(snap.situation, valid_situation());
        assert_eq!(snap.summary.unwrap().predicted_score, 188);
    }

    #[tokio::test]
    async fn test_loaded_entry_failing_checks_renders_outlook() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(
            &path,
            r#"[{"batting_team": "England", "bowling_team": "England", "city": "London",
                 "current_score": 40, "overs": 4.0, "wickets": 0, "last_five": 40,
                 "predicted_score": 200, "timestamp": "18:40"}]"#,
        )
        .unwrap();
        let history = HistoryStore::open(&path, HISTORY_CAPACITY);
        let state = Arc::new(AppState::new(history, Arc::new(RunRateProjection::default())));

        let Json(snap) = load_history_handler(State(state), Path(0)).await.unwrap();
        assert_eq!(snap.lifecycle, Lifecycle::Predicted { predicted_score: 200 });
        assert!(snap.invalid_reason.is_some());
        assert_eq!(snap.features.unwrap().balls_left, 96);
        assert_eq!(snap.outlook.unwrap().percent_complete, 20);
    }

    #[test]
    fn test_snapshot_serializes_lifecycle_tag() {
        let session = SessionState::with_situation(valid_situation());
        let json = serde_json::to_value(SessionSnapshot::of(&session)).unwrap();
        assert_eq!(json["lifecycle"]["state"], "ready");
        assert_eq!(json["situation"]["batting_team"], "Pakistan");
        assert_eq!(json["features"]["balls_left"], 60);
    }
}
