//! Integration tests for the dashboard request handler and its HTTP routes.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use sporeprint_classifiers::report::MetricPlot;
use sporeprint_cli::config::DashboardConfig;
use sporeprint_cli::dashboard::{Classifier, Dashboard, FormState, RAW_DATA_HEADING};
use sporeprint_cli::server::router;

/// 40 rows, 5 columns; `gill-size` tracks the class.
fn write_mushrooms(dir: &tempfile::TempDir) -> DashboardConfig {
    let mut csv = String::from("type,cap-shape,odor,gill-size,habitat\n");
    for i in 0..40 {
        let row = if i % 2 == 0 {
            format!("p,{},{},n,{}\n", ["x", "b", "f"][i % 3], ["f", "s", "y"][(i / 2) % 3], ["u", "d"][i % 2])
        } else {
            format!("e,{},{},b,{}\n", ["x", "b", "f"][i % 3], ["n", "a", "l"][(i / 2) % 3], ["g", "m"][i % 2])
        };
        csv.push_str(&row);
    }
    let path = dir.path().join("mushrooms.csv");
    std::fs::write(&path, csv).unwrap();

    let mut config = DashboardConfig::default();
    config.data.path = path;
    config
}

fn classify_form(classifier: Classifier, metrics: Vec<MetricPlot>) -> FormState {
    FormState {
        classifier,
        lr_c: 1.0,
        svm_c: 1.0,
        metrics,
        classify: true,
        ..FormState::default()
    }
}

// ---------------------------------------------------------------------------
// Request handler
// ---------------------------------------------------------------------------

#[test]
fn selection_without_classify_shows_no_results() {
    let dir = tempfile::tempdir().unwrap();
    let dashboard = Dashboard::new(write_mushrooms(&dir));
    let description = dashboard.handle(&FormState::default()).unwrap();
    assert!(description.results.is_none());
    assert!(description.raw_data.is_none());
    assert!(dashboard.cache().is_loaded());
}

#[test]
fn classify_with_no_metrics_draws_no_charts() {
    let dir = tempfile::tempdir().unwrap();
    let dashboard = Dashboard::new(write_mushrooms(&dir));
    let description = dashboard
        .handle(&classify_form(Classifier::LogisticRegression, Vec::new()))
        .unwrap();
    let results = description.results.unwrap();
    assert_eq!(results.heading, "Logistic Regression Results");
    assert!(results.charts.is_empty());
    for metric in [results.accuracy, results.precision, results.recall] {
        assert!((0.0..=1.0).contains(&metric));
    }
}

#[test]
fn classify_with_all_metrics_draws_three_charts() {
    let dir = tempfile::tempdir().unwrap();
    let dashboard = Dashboard::new(write_mushrooms(&dir));
    for classifier in Classifier::ALL {
        let description = dashboard
            .handle(&classify_form(classifier, MetricPlot::ALL.to_vec()))
            .unwrap();
        let results = description.results.unwrap();
        assert_eq!(results.heading, format!("{} Results", classifier.label()));
        assert_eq!(results.charts.len(), 3);
    }
}

#[test]
fn raw_data_toggle_controls_the_table() {
    let dir = tempfile::tempdir().unwrap();
    let dashboard = Dashboard::new(write_mushrooms(&dir));

    let hidden = dashboard.handle(&FormState::default()).unwrap();
    assert!(hidden.raw_data.is_none());

    let form = FormState {
        show_raw_data: true,
        ..FormState::default()
    };
    let shown = dashboard.handle(&form).unwrap();
    let table = shown.raw_data.unwrap();
    assert_eq!(table.nrows(), 40);
    assert_eq!(table.ncols(), 5);
    assert_eq!(table.columns[0], "type");
}

#[test]
fn missing_dataset_fails_the_interaction() {
    let mut config = DashboardConfig::default();
    config.data.path = "/nonexistent/mushrooms.csv".into();
    let dashboard = Dashboard::new(config);
    let err = dashboard.handle(&FormState::default()).err().unwrap();
    assert!(format!("{:#}", err).contains("Failed to load dataset"));
}

// ---------------------------------------------------------------------------
// HTTP routes
// ---------------------------------------------------------------------------

async fn get(app: axum::Router, uri: &str) -> (StatusCode, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = ServiceExt::<Request<Body>>::oneshot(app, req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(Arc::new(Dashboard::new(write_mushrooms(&dir))));
    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["dataset_loaded"], false);
}

#[tokio::test]
async fn dashboard_page_renders_results() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(Arc::new(Dashboard::new(write_mushrooms(&dir))));
    let (status, body) = get(
        app,
        "/?classifier=random_forest&n_estimators=100&max_depth=3&metrics=confusion_matrix&classify=true&show_raw_data=true",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Random Forest Results"));
    assert!(body.contains("Accuracy: "));
    assert!(body.contains("<h3>Confusion Matrix</h3>"));
    assert!(!body.contains("<h3>ROC Curve</h3>"));
    assert!(body.contains(RAW_DATA_HEADING));
}

#[tokio::test]
async fn out_of_range_input_is_a_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(Arc::new(Dashboard::new(write_mushrooms(&dir))));
    let (status, body) = get(app, "/?classifier=svm&C=50&classify=true").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("outside"));
}

#[tokio::test]
async fn unreadable_dataset_is_a_server_error() {
    let mut config = DashboardConfig::default();
    config.data.path = "/nonexistent/mushrooms.csv".into();
    let app = router(Arc::new(Dashboard::new(config)));
    let (status, _) = get(app, "/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
