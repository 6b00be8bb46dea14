use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use helm_sketch::config::AnalysisConfig;
use helm_sketch::error::AnalysisError;
use helm_sketch::session::{GenerateRejected, SUMMARY_GENERATED, SUMMARY_GENERATION_FAILED};
use helm_sketch::{
    AzureOpenAiClient, Canvas, DiagramAnalyzer, HistoryConfig, LocalStore, Session, SnapshotEncoding,
    SurfaceConfig, ToolKind,
};
use parking_lot::Mutex;

const CHART: &str = "apiVersion: v1\nkind: Service\nmetadata:\n  name: {{ .Values.name }}\n";

/// Answers with a fixed result and counts calls
struct Fixed {
    answer: Result<String, AnalysisError>,
    calls: AtomicUsize,
}

impl Fixed {
    fn new(answer: Result<String, AnalysisError>) -> Arc<Self> {
        Arc::new(Self {
            answer,
            calls: AtomicUsize::new(0),
        })
    }
}

impl DiagramAnalyzer for Fixed {
    fn analyze(&self, png: &[u8]) -> Result<String, AnalysisError> {
        assert!(png.starts_with(b"\x89PNG"));
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

/// Blocks until the test lets it answer
struct Gate {
    release: Mutex<mpsc::Receiver<()>>,
}

impl DiagramAnalyzer for Gate {
    fn analyze(&self, _png: &[u8]) -> Result<String, AnalysisError> {
        let _ = self.release.lock().recv();
        Ok(CHART.to_owned())
    }
}

/// Keeps the image it was asked about
#[derive(Default)]
struct Recorder {
    seen: Mutex<Option<Vec<u8>>>,
}

impl DiagramAnalyzer for Recorder {
    fn analyze(&self, png: &[u8]) -> Result<String, AnalysisError> {
        *self.seen.lock() = Some(png.to_vec());
        Ok(CHART.to_owned())
    }
}

#[test]
fn generation_sees_the_state_undo_stepped_to() {
    let mut canvas = Canvas::new(
        SurfaceConfig::default(),
        HistoryConfig {
            encoding: SnapshotEncoding::Png,
            ..Default::default()
        },
    );
    let blank = canvas.export_image().unwrap();
    let t0 = Instant::now();
    canvas.set_tool(ToolKind::Rectangle);
    canvas.pointer_down(egui::pos2(20.0, 20.0), egui::Color32::BLACK, t0);
    canvas.pointer_up(egui::pos2(120.0, 90.0), egui::Color32::BLACK, t0);
    canvas.tick(t0 + Duration::from_millis(100));

    // Restore is still decoding when generation starts
    assert!(canvas.undo());
    let recorder = Arc::new(Recorder::default());
    let mut session = Session::default();
    session.start_generation(&mut canvas, recorder.clone()).unwrap();
    session.wait_generation();

    assert!(canvas.surface().is_blank());
    assert_eq!(recorder.seen.lock().as_deref(), Some(blank.as_slice()));
}

#[test]
fn successful_generation_replaces_the_text() {
    let mut canvas = Canvas::default();
    let mut session = Session::default();
    let analyzer = Fixed::new(Ok(CHART.to_owned()));

    session.start_generation(&mut canvas, analyzer.clone()).unwrap();
    assert!(session.wait_generation());

    assert!(!session.is_busy());
    assert_eq!(session.yaml(), CHART);
    let report = session.validation().unwrap();
    assert!(report.is_valid);
    assert_eq!(report.summary, SUMMARY_GENERATED);
    assert_eq!(analyzer.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn failed_generation_keeps_the_previous_text() {
    let mut canvas = Canvas::default();
    let mut session = Session::default();
    session.set_yaml("kind: Deployment");

    let failure = AnalysisError::Endpoint {
        status: 401,
        body: "unauthorized".to_owned(),
    };
    session
        .start_generation(&mut canvas, Fixed::new(Err(failure.clone())))
        .unwrap();
    session.wait_generation();

    assert_eq!(session.yaml(), "kind: Deployment");
    let report = session.validation().unwrap();
    assert!(!report.is_valid);
    assert_eq!(report.summary, SUMMARY_GENERATION_FAILED);
    assert_eq!(report.issues, vec![failure.to_string()]);
}

#[test]
fn second_request_is_refused_while_busy() {
    let mut canvas = Canvas::default();
    let mut session = Session::default();
    let (release, gate) = mpsc::channel();
    let analyzer = Arc::new(Gate {
        release: Mutex::new(gate),
    });

    session.start_generation(&mut canvas, analyzer.clone()).unwrap();
    assert!(session.is_busy());
    assert!(!session.poll_generation());

    let other = Fixed::new(Ok("ignored".to_owned()));
    assert_eq!(
        session.start_generation(&mut canvas, other.clone()),
        Err(GenerateRejected::Busy)
    );
    assert_eq!(other.calls.load(Ordering::SeqCst), 0);

    release.send(()).unwrap();
    session.wait_generation();
    assert!(!session.is_busy());
    assert_eq!(session.yaml(), CHART);
}

#[test]
fn missing_configuration_is_enumerated_without_a_request() {
    let mut canvas = Canvas::default();
    let mut session = Session::default();
    let client = AzureOpenAiClient::new(AnalysisConfig::from_lookup(|name| {
        (name == "AZURE_OPENAI_ENDPOINT").then(|| "https://example.invalid".to_owned())
    }));

    session.start_generation(&mut canvas, Arc::new(client)).unwrap();
    session.wait_generation();

    let report = session.validation().unwrap();
    assert_eq!(report.summary, SUMMARY_GENERATION_FAILED);
    let issue = &report.issues[0];
    assert!(issue.contains("AZURE_OPENAI_API_KEY"));
    assert!(issue.contains("AZURE_OPENAI_DEPLOYMENT_NAME"));
    assert!(!issue.contains("AZURE_OPENAI_ENDPOINT"));
}

#[test]
fn clear_drops_text_and_result() {
    let mut canvas = Canvas::default();
    let mut session = Session::default();
    session.set_yaml(CHART);
    session.validate();

    session.clear(&mut canvas, Instant::now());
    assert!(session.yaml().is_empty());
    assert!(session.validation().is_none());
    assert!(canvas.surface().is_blank());
}

#[test]
fn download_and_save_go_to_the_store() {
    let root = std::env::temp_dir().join(format!("helm_sketch_session_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&root);
    let store = LocalStore::new(root.join("storage"), root.join("out"));
    let canvas = Canvas::default();
    let mut session = Session::default();

    assert_eq!(session.download(&store).unwrap(), None);
    session.set_yaml(CHART);
    let path = session.download(&store).unwrap().unwrap();
    assert_eq!(std::fs::read_to_string(path).unwrap(), CHART);

    let saved = session.save_drawing(&store, &canvas).unwrap();
    assert_eq!(store.load_drawing(), Some(saved));
}
