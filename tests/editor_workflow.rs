//! End-to-end editing sessions.
//!
//! Drives the Editor through upload, background removal, background/zoom
//! changes, export and reset, against a fake segmenter and against a mock
//! remove.bg server.

use std::io::Cursor;

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use profile_photo::compositor::Compositor;
use profile_photo::editor::{Editor, EditorState};
use profile_photo::error::{EditorError, ErrorKind};
use profile_photo::segmentation::{
    ProcessedImage, RemoveBgClient, SegmentationConfig, SegmentationError, Segmenter,
};
use profile_photo::upload::{SelectedFile, SourceImage, MAX_UPLOAD_BYTES};
use profile_photo::BackgroundSpec;

const SUBJECT: Rgba<u8> = Rgba([120, 60, 30, 255]);

/// Returns a fixed cut-out, or a fixed failure.
struct FakeSegmenter {
    outcome: Result<RgbaImage, u16>,
}

impl FakeSegmenter {
    fn cutout(size: u32) -> Self {
        Self {
            outcome: Ok(RgbaImage::from_pixel(size, size, SUBJECT)),
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            outcome: Err(status),
        }
    }
}

#[async_trait]
impl Segmenter for FakeSegmenter {
    async fn remove_background(
        &self,
        _source: &SourceImage,
    ) -> Result<ProcessedImage, SegmentationError> {
        match &self.outcome {
            Ok(bitmap) => Ok(ProcessedImage::new(bitmap.clone())),
            Err(status) => Err(SegmentationError::from_status(
                reqwest::StatusCode::from_u16(*status).unwrap(),
                String::new(),
            )),
        }
    }
}

fn jpeg_file(size: u32) -> SelectedFile {
    let img = RgbImage::from_pixel(size, size, Rgb([200, 180, 160]));
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, 90)
        .encode_image(&img)
        .unwrap();
    SelectedFile::new("portrait.jpg", Some("image/jpeg"), bytes)
}

fn png_bytes(img: &RgbaImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn is_subject(p: &Rgba<u8>) -> bool {
    p.0.iter().zip(SUBJECT.0).all(|(a, b)| a.abs_diff(b) <= 2)
}

fn is_white(p: &Rgba<u8>) -> bool {
    p.0 == [255, 255, 255, 255]
}

async fn ready_editor(zoom: u32) -> Editor {
    let mut editor = Editor::default();
    editor.upload(jpeg_file(400)).unwrap();
    assert_eq!(editor.state(), EditorState::Uploaded);
    editor
        .remove_background(&FakeSegmenter::cutout(400))
        .await
        .unwrap();
    assert_eq!(editor.state(), EditorState::Ready);
    editor.select_background(BackgroundSpec::White).unwrap();
    editor.set_zoom(zoom).unwrap();
    editor
}

#[tokio::test]
async fn test_scenario_zoom_100_subject_centered() {
    let editor = ready_editor(100).await;
    let canvas = editor.rendered().unwrap().pixels();
    assert_eq!(canvas.dimensions(), (500, 500));

    // subject covers (50,50)-(450,450)
    assert!(is_subject(canvas.get_pixel(50, 50)));
    assert!(is_subject(canvas.get_pixel(449, 449)));
    assert!(is_subject(canvas.get_pixel(250, 250)));
    assert!(is_white(canvas.get_pixel(49, 250)));
    assert!(is_white(canvas.get_pixel(450, 250)));
    assert!(is_white(canvas.get_pixel(250, 49)));
    assert!(is_white(canvas.get_pixel(250, 450)));
    assert!(is_white(canvas.get_pixel(0, 0)));
}

#[tokio::test]
async fn test_scenario_zoom_50_subject_halved() {
    let editor = ready_editor(50).await;
    let canvas = editor.rendered().unwrap().pixels();

    // 200x200 at (150,150)-(350,350)
    assert!(is_subject(canvas.get_pixel(150, 150)));
    assert!(is_subject(canvas.get_pixel(349, 349)));
    assert!(is_white(canvas.get_pixel(149, 250)));
    assert!(is_white(canvas.get_pixel(350, 250)));
    assert!(is_white(canvas.get_pixel(250, 149)));
    assert!(is_white(canvas.get_pixel(250, 350)));
}

#[tokio::test]
async fn test_render_is_deterministic_for_every_background() {
    let backgrounds = [
        BackgroundSpec::White,
        BackgroundSpec::LightGray,
        BackgroundSpec::Custom(profile_photo::Color::rgb(0x0A, 0x66, 0xC2)),
        BackgroundSpec::Blurred,
    ];

    let mut editor = Editor::new(Compositor::new(120));
    editor.upload(jpeg_file(80)).unwrap();
    editor
        .remove_background(&FakeSegmenter::cutout(80))
        .await
        .unwrap();

    for background in backgrounds {
        editor.select_background(background).unwrap();
        let first = editor.export_bytes().unwrap();
        editor.set_zoom(100).unwrap();
        let second = editor.export_bytes().unwrap();
        assert_eq!(first, second, "render differs for {}", background);
    }
}

#[test]
fn test_blurred_background_fills_the_corners() {
    let blue = profile_photo::Color::rgb(0x0A, 0x66, 0xC2);
    let compositor = Compositor::new(120);
    let subject = ProcessedImage::new(RgbaImage::from_pixel(80, 80, SUBJECT));
    let view = profile_photo::ViewTransform::default();

    let blurred = compositor
        .render(&subject, BackgroundSpec::Blurred, view)
        .unwrap();
    let corner = *blurred.pixels().get_pixel(0, 0);
    assert!(corner.0[3] >= 250, "corner is transparent: {:?}", corner);
    assert!(is_subject(&corner), "corner is {:?}", corner);

    for solid in [
        BackgroundSpec::White,
        BackgroundSpec::LightGray,
        BackgroundSpec::Custom(blue),
    ] {
        let canvas = compositor.render(&subject, solid, view).unwrap();
        assert_ne!(*canvas.pixels().get_pixel(0, 0), corner, "{}", solid);
    }
}

#[tokio::test]
async fn test_oversized_upload_leaves_empty() {
    let mut editor = Editor::default();
    let file = SelectedFile::new("huge.jpg", Some("image/jpeg"), vec![0u8; MAX_UPLOAD_BYTES + 1]);

    let err = editor.upload(file).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TooLarge);
    assert_eq!(editor.state(), EditorState::Empty);
    assert_eq!(editor.error().unwrap().message, "Image must be less than 5MB.");
}

#[tokio::test]
async fn test_unsupported_upload_is_invalid_format() {
    let mut editor = Editor::default();
    for (name, mime) in [
        ("anim.gif", "image/gif"),
        ("photo.webp", "image/webp"),
        ("doc.pdf", "application/pdf"),
    ] {
        let err = editor
            .upload(SelectedFile::new(name, Some(mime), vec![1, 2, 3]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        assert_eq!(editor.state(), EditorState::Empty);
    }
}

#[tokio::test]
async fn test_quota_and_auth_failures_return_to_uploaded() {
    for (status, kind) in [(402, ErrorKind::QuotaExceeded), (401, ErrorKind::AuthError)] {
        let mut editor = Editor::default();
        editor.upload(jpeg_file(40)).unwrap();

        let err = editor
            .remove_background(&FakeSegmenter::failing(status))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), kind);
        assert_eq!(editor.state(), EditorState::Uploaded);
        assert_eq!(editor.error().unwrap().kind, kind);
        assert!(editor.processed().is_none());
    }
}

#[tokio::test]
async fn test_retry_after_failure_succeeds() {
    let mut editor = Editor::default();
    editor.upload(jpeg_file(40)).unwrap();
    let _ = editor
        .remove_background(&FakeSegmenter::failing(500))
        .await;
    assert_eq!(editor.error().unwrap().kind, ErrorKind::ServiceError);

    editor
        .remove_background(&FakeSegmenter::cutout(40))
        .await
        .unwrap();
    assert_eq!(editor.state(), EditorState::Ready);
    assert!(editor.error().is_none());
}

#[tokio::test]
async fn test_reset_from_every_state() {
    // Uploaded
    let mut editor = Editor::default();
    editor.upload(jpeg_file(20)).unwrap();
    editor.reset();
    assert_eq!(editor.state(), EditorState::Empty);
    assert!(editor.source().is_none());

    // Processing
    let mut editor = Editor::default();
    editor.upload(jpeg_file(20)).unwrap();
    let pending = editor.begin_removal().unwrap();
    editor.reset();
    assert_eq!(editor.state(), EditorState::Empty);
    editor
        .complete_removal(pending, Ok(ProcessedImage::new(RgbaImage::new(20, 20))))
        .unwrap();
    assert_eq!(editor.state(), EditorState::Empty);

    // Ready, with an error showing
    let mut editor = ready_editor(100).await;
    assert!(matches!(
        editor.set_custom_color("nope"),
        Err(EditorError::InvalidColor(_))
    ));
    editor.reset();
    assert_eq!(editor.state(), EditorState::Empty);
    assert!(editor.source().is_none());
    assert!(editor.processed().is_none());
    assert!(editor.rendered().is_none());
    assert!(editor.error().is_none());
}

#[tokio::test]
async fn test_export_writes_fixed_filename() {
    let dir = tempfile::tempdir().unwrap();
    let mut editor = ready_editor(100).await;
    let path = editor.export(dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), "linkedin-profile-photo.png");

    let saved = image::open(&path).unwrap().to_rgba8();
    assert_eq!(&saved, editor.rendered().unwrap().pixels());
}

mod mock_service {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> RemoveBgClient {
        RemoveBgClient::new(
            SegmentationConfig::new(Some("test-key".to_string()))
                .with_endpoint(format!("{}/v1.0/removebg", server.uri())),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_full_session_against_mock_service() {
        let server = MockServer::start().await;

        let mut cutout = RgbaImage::from_pixel(400, 400, Rgba([0, 0, 0, 0]));
        for y in 100..300 {
            for x in 100..300 {
                cutout.put_pixel(x, y, SUBJECT);
            }
        }
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(&cutout)))
            .expect(1)
            .mount(&server)
            .await;

        let mut editor = Editor::default();
        editor.upload(jpeg_file(400)).unwrap();
        editor.remove_background(&client(&server)).await.unwrap();
        assert_eq!(editor.state(), EditorState::Ready);

        let canvas = editor.rendered().unwrap().pixels();
        // transparent margin of the cut-out shows the white fill
        assert!(is_white(canvas.get_pixel(60, 60)));
        // opaque core lands at 50 + 100 = 150
        assert!(is_subject(canvas.get_pixel(150, 150)));
        assert!(is_subject(canvas.get_pixel(349, 349)));
        assert!(is_white(canvas.get_pixel(350, 350)));
    }

    #[tokio::test]
    async fn test_402_from_service_leaves_uploaded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(402))
            .mount(&server)
            .await;

        let mut editor = Editor::default();
        editor.upload(jpeg_file(40)).unwrap();
        let err = editor.remove_background(&client(&server)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::QuotaExceeded);
        assert_eq!(editor.state(), EditorState::Uploaded);
    }

    #[tokio::test]
    async fn test_401_from_service_leaves_uploaded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let mut editor = Editor::default();
        editor.upload(jpeg_file(40)).unwrap();
        let err = editor.remove_background(&client(&server)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AuthError);
        assert_eq!(editor.state(), EditorState::Uploaded);
        assert_eq!(
            editor.error().unwrap().message,
            "Invalid API key. Please check your configuration."
        );
    }
}
