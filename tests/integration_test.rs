// Integration tests for the full pipeline: source -> layout -> render -> file

mod fixtures;

use calendar_image::models::color::RgbColor;
use calendar_image::models::event::RawEvent;
use calendar_image::models::settings::{LayoutConfig, Theme};
use calendar_image::services::delivery::write_output;
use calendar_image::services::layout::{build_month_layout, ApproxTextMeasure, PixelRect};
use calendar_image::services::poller::{ChangePoller, PollDecision};
use calendar_image::services::render::{
    compose_scene, render_month, OutputFormat, PdfBackend, PngBackend, Primitive,
};
use calendar_image::services::source::{EventSource, JsonFileSource, SourceError};
use fixtures::dates::ymd;
use fixtures::events::busy_september;
use mockall::mock;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

mock! {
    pub Source {}

    impl EventSource for Source {
        fn events_for_month(&self, year: i32, month: u32) -> Result<Vec<RawEvent>, SourceError>;
        fn version_tag(&self) -> Result<Option<String>, SourceError>;
    }
}

fn render_png(events: &[RawEvent]) -> Vec<u8> {
    render_month(
        2025,
        9,
        events,
        &LayoutConfig::default(),
        &Theme::default(),
        &ApproxTextMeasure::default(),
        &PngBackend::default(),
    )
    .expect("Failed to render September")
}

#[test]
fn test_busy_month_layout() {
    let config = LayoutConfig::default();
    let layout =
        build_month_layout(2025, 9, &busy_september(), &config, &ApproxTextMeasure::default())
            .unwrap();

    assert_eq!(layout.grid.row_count(), 5);
    // The broken event is skipped, everything else touches September
    assert_eq!(layout.events.len(), 9);

    // Sept 3 has RustConf plus three single-day events: one is dropped
    let wednesday: Vec<_> = layout
        .pills_in_week(0)
        .filter(|pill| pill.segment.start_column <= 3 && pill.segment.end_column >= 3)
        .map(|pill| pill.label.as_str())
        .collect();
    assert_eq!(wednesday, vec!["RustConf", "Dentist", "Lunch with the wh..."]);

    // Trip is clipped to the last row of September
    let trip = layout
        .pills
        .iter()
        .find(|pill| pill.segment.title == "Family trip to Jeju")
        .unwrap();
    assert_eq!(trip.segment.week_index, 4);
    assert_eq!((trip.segment.start_column, trip.segment.end_column), (0, 2));
}

#[test]
fn test_render_is_idempotent() {
    let events = busy_september();
    let first = render_png(&events);
    let second = render_png(&events);

    assert!(first.starts_with(&[0x89, b'P', b'N', b'G']));
    assert_eq!(first, second);
}

#[test]
fn test_scene_is_idempotent() {
    let config = LayoutConfig::default();
    let measure = ApproxTextMeasure::default();
    let build = || {
        let layout = build_month_layout(2025, 9, &busy_september(), &config, &measure).unwrap();
        compose_scene(&layout, &config, &Theme::default(), &measure)
    };
    assert_eq!(build(), build());
}

#[test]
fn test_events_change_the_image() {
    let empty = render_png(&[]);
    let busy = render_png(&busy_september());
    assert_ne!(empty, busy);
}

#[test]
fn test_pdf_render_contains_title() {
    let config = LayoutConfig::default();
    let measure = ApproxTextMeasure::default();
    let layout = build_month_layout(2025, 9, &busy_september(), &config, &measure).unwrap();
    let scene = compose_scene(&layout, &config, &Theme::default(), &measure);

    let has_title = scene.primitives.iter().any(|primitive| {
        matches!(primitive, Primitive::Text { text, .. } if text == "September")
    });
    assert!(has_title);

    let bytes = render_month(
        2025,
        9,
        &busy_september(),
        &config,
        &Theme::default(),
        &measure,
        &PdfBackend::default(),
    )
    .unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_json_source_to_file() {
    let dir = TempDir::new().unwrap();
    let events_path = dir.path().join("events.json");
    std::fs::write(
        &events_path,
        serde_json::to_string_pretty(&busy_september()).unwrap(),
    )
    .unwrap();

    let source = JsonFileSource::new(&events_path);
    let events = source.events_for_month(2025, 9).unwrap();
    assert_eq!(events.len(), busy_september().len());

    let backend = OutputFormat::Png.backend();
    let bytes = render_month(
        2025,
        9,
        &events,
        &LayoutConfig::default(),
        &Theme::default(),
        &ApproxTextMeasure::default(),
        backend.as_ref(),
    )
    .unwrap();
    let path = write_output(&dir.path().join("out"), 2025, 9, backend.file_extension(), &bytes)
        .unwrap();

    assert!(path.ends_with("calendar_2025_09.png"));
    assert_eq!(std::fs::read(path).unwrap(), bytes);
}

#[test]
fn test_malformed_json_records_do_not_cost_the_month() {
    let dir = TempDir::new().unwrap();
    let events_path = dir.path().join("events.json");

    let mut records = serde_json::to_value(busy_september()).unwrap();
    let list = records.as_array_mut().unwrap();
    list.push(serde_json::json!({"id": "no-start", "title": "Lost", "end": "2025-09-10"}));
    list.push(serde_json::json!({"id": "numeric", "title": "Bad", "start": 20250910, "end": 1}));
    list.push(serde_json::json!(["not", "an", "event"]));
    std::fs::write(&events_path, serde_json::to_string(&records).unwrap()).unwrap();

    let source = JsonFileSource::new(&events_path);
    let events = source.events_for_month(2025, 9).unwrap();
    assert_eq!(events.len(), busy_september().len());

    let config = LayoutConfig::default();
    let layout =
        build_month_layout(2025, 9, &events, &config, &ApproxTextMeasure::default()).unwrap();
    assert_eq!(layout.events.len(), 9);
    assert!(layout.pills.iter().any(|pill| pill.label == "Dentist"));

    let bytes = render_png(&events);
    assert_eq!(bytes, render_png(&busy_september()));
}

#[test]
fn test_png_contains_text() {
    let config = LayoutConfig::default();
    let theme = Theme::default();
    let layout =
        build_month_layout(2025, 9, &busy_september(), &config, &ApproxTextMeasure::default())
            .unwrap();
    let image = image::load_from_memory(&render_png(&busy_september()))
        .unwrap()
        .to_rgb8();

    let ink_in = |rect: PixelRect, color: RgbColor| {
        (rect.top.max(0)..rect.bottom)
            .flat_map(|y| (rect.left.max(0)..rect.right).map(move |x| (x as u32, y as u32)))
            .filter(|&(x, y)| image.get_pixel(x, y).0 == [color.r, color.g, color.b])
            .count()
    };

    let dentist = layout
        .pills
        .iter()
        .find(|pill| pill.label == "Dentist")
        .unwrap();
    assert!(ink_in(dentist.rect, theme.pill_text) > 20);

    // Month title sits left of the weekday header
    let title_area = PixelRect::new(0, 0, config.image_width as i32, config.grid_top as i32);
    assert!(ink_in(title_area, theme.title) > 100);
}

#[test]
fn test_poller_skips_unchanged_source() {
    let mut source = MockSource::new();
    let mut tags = vec![Some("v2".to_string()), Some("v1".to_string()), Some("v1".to_string())];
    source
        .expect_version_tag()
        .times(3)
        .returning(move || Ok(tags.pop().flatten()));
    source
        .expect_events_for_month()
        .times(2)
        .returning(|_, _| Ok(vec![fixtures::events::single_day("a", "A", ymd(2025, 9, 3))]));

    let mut poller = ChangePoller::new();
    let mut renders = 0;
    for _ in 0..3 {
        if poller.poll(&source).unwrap() == PollDecision::Render {
            let events = source.events_for_month(2025, 9).unwrap();
            render_png(&events);
            renders += 1;
        }
    }

    assert_eq!(renders, 2);
    assert_eq!(poller.last_tag(), Some("v2"));
}

#[test]
fn test_invalid_month_fails_fast() {
    let result = render_month(
        2025,
        13,
        &busy_september(),
        &LayoutConfig::default(),
        &Theme::default(),
        &ApproxTextMeasure::default(),
        &PngBackend::default(),
    );
    assert!(result.is_err());
}
