use std::process::Command;

#[test]
fn sim_binary_smoke() {
    let output = Command::new(env!("CARGO_BIN_EXE_sim"))
        .args(["1", "hard", "easy"])
        .output()
        .expect("failed to run sim binary");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).expect("non utf8 output");
    let v: serde_json::Value = serde_json::from_str(stdout.trim()).expect("invalid json");

    let results = [v["player_a"]["result"].as_str(), v["player_b"]["result"].as_str()];
    assert!(
        results == [Some("Won"), Some("Lost")] || results == [Some("Lost"), Some("Won")],
        "{:?}",
        results
    );
    assert_eq!(v["player_a"]["difficulty"], "hard");
    assert_eq!(v["leaderboard"].as_array().map(Vec::len), Some(2));
    assert_eq!(v["leaderboard"][0]["wins"], 1);
}

#[test]
fn sim_binary_rejects_bad_args() {
    let output = Command::new(env!("CARGO_BIN_EXE_sim"))
        .args(["1", "nightmare", "easy"])
        .output()
        .expect("failed to run sim binary");
    assert!(!output.status.success());
}
