use mbti_engine::config::Config;

#[test]
fn parse_example_config() {
    let raw = include_str!("../mbti-engine.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert!(!cfg.paths.output_dir.is_empty());
    assert_eq!(cfg.workbook.table_style, "TableStyleMedium9");
    assert_eq!(cfg.postprocess.control_chars_to_sanitize.len(), 30);
    assert!(cfg.security.reject_url_inputs);
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let cfg: Config = toml::from_str("[workbook]\nfilename = \"team.xlsx\"\n").expect("parse TOML");
    assert_eq!(cfg.workbook.filename, "team.xlsx");
    assert_eq!(cfg.workbook.table_style, "TableStyleMedium9");
    assert_eq!(cfg.paths.text_dir, "output/text");
    assert_eq!(cfg.paths.media_dir, "media");
}

#[test]
fn env_overrides_replace_paths() {
    let mut cfg = Config::default();
    cfg.apply_env(|k| match k {
        "MBTI_INPUT_DIR" => Some("/data/reports".to_string()),
        "MBTI_TEXT_DIR" => Some("  ".to_string()),
        "MBTI_MEDIA_DIR" => Some("/data/graphs".to_string()),
        _ => None,
    });
    assert_eq!(cfg.paths.input_dir, "/data/reports");
    assert_eq!(cfg.paths.media_dir, "/data/graphs");
    assert_eq!(cfg.paths.text_dir, "output/text");
}
