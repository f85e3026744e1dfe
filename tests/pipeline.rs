use fakeprofile::{
    CsvSink, FetchError, ForestParams, Label, PredictionError, PredictionService, ProfileDirectory,
    dataset, load_model,
};
use std::fmt::Write as _;
use std::path::Path;

const HEADER: &str = "profile pic,nums/length username,fullname words,nums/length fullname,\
name==username,description length,external URL,private,#posts,#followers,#follows,fake";

/// Real rows have a picture and an audience; fake rows are bare with digit-heavy names.
fn write_dataset(path: &Path, rows: u32) {
    let mut csv = format!("{HEADER}\n");
    for i in 0..rows {
        writeln!(csv, "1,0.0,2,0.0,0,{},1,0,{},{},{},0", 20 + i % 50, 10 + i, 200 + i * 7, 150 + i).unwrap();
        writeln!(csv, "0,0.{},0,0.0,0,0,0,0,{},{},{},1", 3 + i % 5, i % 3, i % 40, 700 + i).unwrap();
    }
    std::fs::write(path, csv).unwrap();
}

fn write_profile(dir: &Path, username: &str, full_name: &str, pic: bool, followers: u64) {
    let json = serde_json::json!({
        "username": username,
        "full_name": full_name,
        "has_profile_pic": pic,
        "biography": if pic { "hiking, photos and long walks" } else { "" },
        "external_url": if pic { Some("https://example.com") } else { None },
        "is_private": false,
        "media_count": if pic { 40 } else { 0 },
        "follower_count": followers,
        "followee_count": if pic { 180 } else { 750 },
    });
    std::fs::write(dir.join(format!("{username}.json")), json.to_string()).unwrap();
}

fn small_params() -> ForestParams {
    ForestParams {
        n_trees: 20,
        ..ForestParams::default()
    }
}

#[test]
fn train_save_load_and_predict() {
    let dir = tempfile::tempdir().unwrap();
    let train_csv = dir.path().join("train.csv");
    let model_path = dir.path().join("model.msgpack");
    let profiles = dir.path().join("profiles");
    std::fs::create_dir(&profiles).unwrap();
    write_dataset(&train_csv, 60);

    let run = fakeprofile::train(&train_csv, 0.2, &small_params()).unwrap();
    assert_eq!(run.train_rows + run.test_rows, 120);
    assert_eq!(run.test_rows, 24);
    assert!(run.holdout_accuracy.unwrap() > 0.9);
    run.model.save_to_file(&model_path).unwrap();

    write_profile(&profiles, "jane.doe", "Jane Doe", true, 950);
    write_profile(&profiles, "user84629173", "", false, 3);

    let sink = CsvSink::open(&dir.path().join("predictions.csv")).unwrap();
    let service = PredictionService::new(load_model(&model_path), ProfileDirectory::new(&profiles), sink);
    assert!(service.is_available());

    assert_eq!(service.predict("jane.doe").unwrap().prediction, Label::Real);
    let bot = service.predict("user84629173").unwrap();
    assert_eq!(bot.prediction, Label::Fake);
    assert_eq!(bot.features.as_array()[1], 0.6667);

    assert!(matches!(
        service.predict("nobody"),
        Err(PredictionError::Upstream(FetchError::NotFound(_)))
    ));
}

#[test]
fn evaluation_uses_the_same_column_mapping() {
    let dir = tempfile::tempdir().unwrap();
    let train_csv = dir.path().join("train.csv");
    write_dataset(&train_csv, 40);
    let run = fakeprofile::train(&train_csv, 0.0, &small_params()).unwrap();
    assert!(run.holdout_accuracy.is_none());

    // Same data, columns reversed.
    let contents = std::fs::read_to_string(&train_csv).unwrap();
    let reversed: String = contents
        .lines()
        .map(|line| line.split(',').rev().collect::<Vec<_>>().join(",") + "\n")
        .collect();
    let test_csv = dir.path().join("test.csv");
    std::fs::write(&test_csv, reversed).unwrap();

    let records = dataset::load_labeled(&test_csv).unwrap();
    let report = fakeprofile::evaluate(&run.model, &records);
    assert_eq!(report.accuracy, 1.0);
    assert_eq!(report.real.support, 40);
    assert_eq!(report.fake.support, 40);
}

#[test]
fn missing_model_disables_prediction() {
    let dir = tempfile::tempdir().unwrap();
    let corrupt = dir.path().join("corrupt.msgpack");
    std::fs::write(&corrupt, b"\x00\x01garbage").unwrap();

    assert!(load_model(&dir.path().join("absent.msgpack")).is_none());
    assert!(load_model(&corrupt).is_none());

    let sink = CsvSink::open(&dir.path().join("predictions.csv")).unwrap();
    let service = PredictionService::new(load_model(&corrupt), ProfileDirectory::new(dir.path()), sink);
    let err = service.predict("anyone").unwrap_err();
    assert!(matches!(err, PredictionError::ModelUnavailable));
    assert!(err.to_string().contains("not loaded"));
}

#[test]
fn concurrent_predictions_append_whole_lines() {
    let dir = tempfile::tempdir().unwrap();
    let train_csv = dir.path().join("train.csv");
    let model_path = dir.path().join("model.msgpack");
    let output = dir.path().join("predictions.csv");
    write_dataset(&train_csv, 30);
    fakeprofile::train(&train_csv, 0.2, &small_params())
        .unwrap()
        .model
        .save_to_file(&model_path)
        .unwrap();

    let usernames: Vec<String> = (0..50).map(|i| format!("member{i:02}")).collect();
    for (i, username) in usernames.iter().enumerate() {
        write_profile(dir.path(), username, "Some Member", i % 2 == 0, 10 * i as u64);
    }

    let sink = CsvSink::open(&output).unwrap();
    let service = PredictionService::new(load_model(&model_path), ProfileDirectory::new(dir.path()), sink);

    std::thread::scope(|scope| {
        for username in &usernames {
            let service = &service;
            scope.spawn(move || {
                let outcome = service.predict(username).unwrap();
                assert!(outcome.is_persisted());
            });
        }
    });

    let contents = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 51);
    assert!(lines[0].starts_with("username,profile pic"));
    for line in &lines[1..] {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 13, "malformed line: {line}");
        assert!(fields[0].starts_with("member"));
        assert!(matches!(fields[12], "Real" | "Fake"));
    }
    let mut seen: Vec<&str> = lines[1..].iter().map(|l| l.split(',').next().unwrap()).collect();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 50);
}
