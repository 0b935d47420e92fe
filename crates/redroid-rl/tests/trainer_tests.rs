use redroid_rl::{
    calculate_reward, run_training, JsonDirSink, NullSink, QAgent, RlConfig, ScriptedEnvironment,
    Snapshot, State,
};
use redroid_s2r::types::{ActionType, ActionVariant, Step};
use redroid_ui::{UiElement, UiNode, UiTree};

const PKG: &str = "com.example.app";

fn button(text: &str) -> UiElement {
    UiElement {
        text: text.to_string(),
        clickable: true,
        class: "android.widget.Button".to_string(),
        package: PKG.to_string(),
        enabled: true,
        visible: true,
        ..UiElement::default()
    }
}

fn click_step(index: i32, target_word: &str) -> Step {
    let mut v = ActionVariant::of(ActionType::Click);
    v.target_word = target_word.to_string();
    v.enabled = true;
    Step {
        index,
        subject: String::new(),
        relation: String::new(),
        object: String::new(),
        sentence: format!("I tap the {target_word}."),
        ui_actions: vec![v],
    }
}

fn greedy_cfg() -> RlConfig {
    RlConfig {
        epsilon: 0.0,
        state_based_epsilon: false,
        training_epochs: 3,
        ..RlConfig::for_package(PKG)
    }
}

fn snapshot(texts: &[&str]) -> Snapshot {
    Snapshot {
        ui: UiTree::new(texts.iter().map(|t| UiNode::leaf(button(t))).collect()),
        frame: None,
    }
}

#[test]
fn crash_after_the_matching_click_reproduces_in_one_epoch() {
    let cfg = greedy_cfg();
    let mut env = ScriptedEnvironment::new(vec![
        snapshot(&["Settings", "About"]),
        snapshot(&["Crash screen"]),
    ])
    .crash_after_executions(1);
    let mut agent = QAgent::new(cfg);
    let dir = tempfile::tempdir().unwrap();
    let mut sink = JsonDirSink::new(dir.path()).unwrap();

    let steps = [click_step(1, "settings")];
    let outcome = run_training(&mut env, &mut agent, &steps, &mut sink).unwrap();

    assert!(outcome.reproduced);
    assert_eq!(outcome.epochs_run, 1);
    assert_eq!(outcome.executed.len(), 1);
    assert_eq!(outcome.executed[0].step_index, 1);
    assert_eq!(outcome.executed[0].event.text, "Settings");
    assert_eq!(env.executed().len(), 1);

    let exported =
        std::fs::read_to_string(dir.path().join("success_action_seq.json")).unwrap();
    assert!(exported.contains("I tap the settings."));
}

#[test]
fn an_empty_screen_fails_every_epoch_without_executing_anything() {
    let cfg = RlConfig {
        training_epochs: 2,
        ..greedy_cfg()
    };
    let mut env = ScriptedEnvironment::new(vec![Snapshot::empty()]);
    let mut agent = QAgent::new(cfg);

    let steps = [click_step(1, "settings")];
    let outcome = run_training(&mut env, &mut agent, &steps, &mut NullSink).unwrap();

    assert!(!outcome.reproduced);
    assert_eq!(outcome.epochs_run, 2);
    assert_eq!(outcome.epoch_rewards, vec![0.0, 0.0]);
    assert!(outcome.executed.is_empty());
    assert!(env.executed().is_empty());
    assert_eq!(env.resets(), 2);
}

#[test]
fn exhausting_the_epoch_budget_persists_learning_but_exports_no_success() {
    let cfg = RlConfig {
        training_epochs: 2,
        ..greedy_cfg()
    };
    let mut env = ScriptedEnvironment::new(vec![
        snapshot(&["Settings", "About"]),
        snapshot(&["Detail"]),
    ]);
    let mut agent = QAgent::new(cfg.clone());
    let dir = tempfile::tempdir().unwrap();
    let mut sink = JsonDirSink::new(dir.path()).unwrap();

    let steps = [click_step(1, "settings")];
    let outcome = run_training(&mut env, &mut agent, &steps, &mut sink).unwrap();

    assert!(!outcome.reproduced);
    assert_eq!(outcome.epochs_run, 2);
    assert!(outcome.executed.is_empty());
    // One matching click per epoch; afterwards no step remains and the next
    // screen offers nothing to match, ending the epoch.
    assert_eq!(env.executed().len(), 2);

    // The learned value for the matching click survives in the agent.
    let start = State::from_snapshot(&snapshot(&["Settings", "About"]).ui, &steps, 2, &cfg);
    let settings_click = start
        .actions
        .iter()
        .find(|a| !a.matched_with_noop() && a.event.target.element.text == "Settings")
        .unwrap();
    assert!(agent
        .q_value(start.key(), settings_click.key())
        .is_some());

    assert!(dir.path().join("q_table.json").exists());
    assert!(dir.path().join("rewards.json").exists());
    assert!(dir.path().join("epoch_0_step_0.json").exists());
    assert!(!dir.path().join("success_action_seq.json").exists());
}

#[test]
fn settings_icon_example_yields_one_click_pairing_with_exact_similarity() {
    let cfg = RlConfig::for_package(PKG);
    let icon = UiElement {
        content_desc: "Settings icon".to_string(),
        class: "android.widget.ImageButton".to_string(),
        clickable: true,
        package: PKG.to_string(),
        enabled: true,
        visible: true,
        ..UiElement::default()
    };
    let tree = UiTree::new(vec![UiNode::leaf(icon.clone())]);
    let steps = [click_step(1, "Settings icon")];

    let state = State::from_snapshot(&tree, &steps, 0, &cfg);
    let pairings: Vec<_> = state
        .actions
        .iter()
        .filter(|a| !a.matched_with_noop() && a.event.target.element == icon)
        .collect();
    assert_eq!(pairings.len(), 1);

    let reward = calculate_reward(pairings[0], &cfg);
    assert_eq!(reward.components["textual_similarity"], 1.0);
}

#[test]
fn noop_exploration_spends_the_missing_step_budget() {
    // No real steps and lenient matching: every action is a no-op and each
    // one burns one unit of budget until the state itself goes terminal.
    let cfg = RlConfig {
        training_epochs: 1,
        allowed_missing_steps: 2,
        match_missing_after_all_steps: true,
        ..greedy_cfg()
    };
    let mut env = ScriptedEnvironment::new(vec![
        snapshot(&["Alpha"]),
        snapshot(&["Beta"]),
        snapshot(&["Gamma"]),
    ]);
    let mut agent = QAgent::new(cfg);

    let outcome = run_training(&mut env, &mut agent, &[], &mut NullSink).unwrap();

    assert!(!outcome.reproduced);
    // Budget 2 allows exactly two no-op executions; the third state has
    // budget 0, no steps, and with lenient matching still only no-ops, which
    // the zero budget no longer permits.
    assert_eq!(env.executed().len(), 2);
}
