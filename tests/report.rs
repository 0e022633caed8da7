use std::fs;
use std::path::{Path, PathBuf};

use deorbit_report::config::ReportConfig;
use deorbit_report::render::RenderError;
use deorbit_report::{run, LoadError, ReportError};
use image::Rgb;
use tempfile::TempDir;

const HEADER: &str = "Altitude_km,DeltaV_ms,DecayTime_years,ESA_Compliant\n";
const GREEN: Rgb<u8> = Rgb([0, 128, 0]);

fn write_table(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("deorbit_analysis.csv");
    fs::write(&path, format!("{HEADER}{body}")).unwrap();
    path
}

/// Small, fast configuration writing into `dir/plots/`.
fn config_for(dir: &Path, input: PathBuf) -> ReportConfig {
    fs::create_dir_all(dir.join("plots")).unwrap();
    let mut config = ReportConfig::default();
    config.input.path = input;
    config.output.path = dir.join("plots").join("report.png");
    config.output.dpi = 40.0;
    config
}

fn contains_color(path: &Path, color: Rgb<u8>) -> bool {
    image::open(path)
        .unwrap()
        .to_rgb8()
        .pixels()
        .any(|p| *p == color)
}

#[test]
fn renders_example_table_to_single_png() {
    let dir = TempDir::new().unwrap();
    let input = write_table(dir.path(), "400,120.5,1.2,true\n800,340.0,45.7,false\n");
    let config = config_for(dir.path(), input);

    let written = run(&config).unwrap();
    assert_eq!(written, config.output.path);

    let entries: Vec<_> = fs::read_dir(dir.path().join("plots")).unwrap().collect();
    assert_eq!(entries.len(), 1);

    let image = image::open(&written).unwrap().to_rgb8();
    let (w, h) = image.dimensions();
    assert!(w > 0 && w <= 14 * 40 && h > 0 && h <= 10 * 40, "{w}x{h}");
    assert!(contains_color(&written, GREEN));
}

#[test]
fn rerun_overwrites_previous_output() {
    let dir = TempDir::new().unwrap();
    let input = write_table(dir.path(), "500,130.0,8.5,true\n");
    let config = config_for(dir.path(), input);
    fs::write(&config.output.path, b"previous run").unwrap();

    run(&config).unwrap();
    let first = image::open(&config.output.path).unwrap().to_rgb8();
    run(&config).unwrap();
    let second = image::open(&config.output.path).unwrap().to_rgb8();

    assert_eq!(fs::read_dir(dir.path().join("plots")).unwrap().count(), 1);
    assert_eq!(first, second);
}

#[test]
fn empty_table_still_renders() {
    let dir = TempDir::new().unwrap();
    let input = write_table(dir.path(), "");
    let config = config_for(dir.path(), input);

    let written = run(&config).unwrap();
    assert!(written.is_file());
}

#[test]
fn no_green_bars_when_nothing_complies() {
    let dir = TempDir::new().unwrap();
    let input = write_table(dir.path(), "700,179.8,91.0,false\n900,231.0,610.0,0\n");
    let config = config_for(dir.path(), input);

    let written = run(&config).unwrap();
    assert!(!contains_color(&written, GREEN));
}

#[test]
fn untrimmed_figure_keeps_full_pixel_size() {
    let dir = TempDir::new().unwrap();
    let input = write_table(dir.path(), "400,120.5,1.2,true\n");
    let mut config = config_for(dir.path(), input);
    config.output.tight_bbox = false;

    let written = run(&config).unwrap();
    assert_eq!(image::open(&written).unwrap().to_rgb8().dimensions(), (560, 400));
}

#[test]
fn extreme_values_render_without_hanging() {
    let dir = TempDir::new().unwrap();
    let input = write_table(dir.path(), "-1e308,100,1,true\n1e308,200,2,false\n");
    let config = config_for(dir.path(), input);

    let written = run(&config).unwrap();
    assert!(written.is_file());
}

#[test]
fn configured_font_that_does_not_exist_is_fatal() {
    let dir = TempDir::new().unwrap();
    let input = write_table(dir.path(), "400,120.5,1.2,true\n");
    let mut config = config_for(dir.path(), input);
    run(&config).unwrap();
    fs::remove_file(&config.output.path).unwrap();

    config.style.font = Some(PathBuf::from("/no/such/font.ttf"));
    let err = run(&config).unwrap_err();
    assert!(matches!(err, ReportError::Render(RenderError::FontRead { .. })));
    assert!(!config.output.path.exists());
}

#[test]
fn missing_column_fails_before_rendering() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("no_esa.csv");
    fs::write(&input, "Altitude_km,DeltaV_ms,DecayTime_years\n400,120.5,1.2\n").unwrap();
    let config = config_for(dir.path(), input);

    match run(&config) {
        Err(ReportError::Load(err @ LoadError::MissingColumns { .. })) => {
            assert!(err.to_string().contains("ESA_Compliant"));
        }
        other => panic!("expected schema error, got {other:?}"),
    }
    assert!(!config.output.path.exists());
}

#[test]
fn missing_input_names_path() {
    let dir = TempDir::new().unwrap();
    let config = config_for(dir.path(), dir.path().join("absent.csv"));

    let err = run(&config).unwrap_err();
    assert!(matches!(err, ReportError::Load(LoadError::NotFound { .. })));
    assert!(err.to_string().contains("absent.csv"));
}

#[test]
fn missing_output_directory_is_fatal() {
    let dir = TempDir::new().unwrap();
    let input = write_table(dir.path(), "400,120.5,1.2,true\n");
    let mut config = config_for(dir.path(), input);
    config.output.path = dir.path().join("nowhere").join("report.png");

    let err = run(&config).unwrap_err();
    assert!(matches!(
        err,
        ReportError::Render(RenderError::OutputDirMissing { .. })
    ));
    assert!(err.to_string().contains("nowhere"));
}
