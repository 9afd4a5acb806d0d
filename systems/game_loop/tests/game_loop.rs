use std::time::Duration;

use contagion_board::query;
use contagion_core::{Adjacency, LevelNumber, LevelTemplate, TilePosition, TileStatus};
use contagion_system_game_loop::{
    Config, GameEvent, GameLoop, Haptics, NoHaptics, Phase, TaskPurpose, Transition,
};
use contagion_system_levels::{Catalog, LevelController};

const SPREAD: Duration = Duration::from_millis(150);
const TRANSITION: Duration = Duration::from_millis(500);

#[derive(Debug, Default)]
struct RecordingHaptics {
    requests: Vec<Duration>,
}

impl Haptics for RecordingHaptics {
    fn vibrate(&mut self, duration: Duration) {
        self.requests.push(duration);
    }
}

fn catalog(layouts: &[&str]) -> Catalog {
    let templates = layouts
        .iter()
        .enumerate()
        .map(|(index, layout)| {
            LevelTemplate::from_ascii(format!("Test {}", index + 1), Adjacency::Orthogonal, layout)
                .expect("layout parses")
        })
        .collect();
    Catalog::new(templates)
}

fn started<H: Haptics>(
    layouts: &[&str],
    haptics: H,
    config: Config,
) -> (GameLoop<Catalog, H>, Vec<GameEvent>) {
    let mut game = GameLoop::new(LevelController::new(catalog(layouts)), haptics, config);
    let mut events = Vec::new();
    game.start(LevelNumber::FIRST, &mut events);
    (game, events)
}

fn at(row: u32, column: u32) -> TilePosition {
    TilePosition::new(row, column)
}

fn swipe<C, H>(game: &mut GameLoop<C, H>, path: &[TilePosition], out: &mut Vec<GameEvent>)
where
    C: contagion_system_levels::LevelCatalog,
    H: Haptics,
{
    let (first, rest) = path.split_first().expect("path is not empty");
    assert!(game.press(*first, out));
    for position in rest {
        assert!(game.drag(*position, out));
    }
}

fn spread_steps(events: &[GameEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, GameEvent::SpreadStepped { .. }))
        .count()
}

// Leaves a yellow and a red malignant tile with no legal match between them.
const STUCK: &str = "bbyR";

fn stuck_in_auto_play<H: Haptics>(haptics: H, config: Config) -> GameLoop<Catalog, H> {
    let (mut game, _) = started(&[STUCK], haptics, config);
    let mut events = Vec::new();
    swipe(&mut game, &[at(0, 0), at(0, 1)], &mut events);
    let matched = game.release(&mut events).expect("blue pair matches");
    assert_eq!(matched.count(), 2);
    game
}

#[test]
fn start_builds_first_level() {
    let (game, events) = started(&["bbB"], NoHaptics, Config::default());

    assert_eq!(game.phase(), Phase::AwaitingSelection);
    assert!(events.contains(&GameEvent::LevelStarted {
        level: LevelNumber::FIRST,
        title: "Test 1".to_owned(),
    }));
    assert_eq!(query::count_status(game.board(), TileStatus::Malignant), 1);
}

#[test]
fn clearing_contamination_wins_and_advances_after_transition() {
    let (mut game, _) = started(&["bbB", "bbR\nyyy"], NoHaptics, Config::default());
    let mut events = Vec::new();

    swipe(&mut game, &[at(0, 0), at(0, 1), at(0, 2)], &mut events);
    let matched = game.release(&mut events).expect("blue row matches");
    assert_eq!(matched.cured(), 1);
    assert_eq!(game.phase(), Phase::Won);
    assert_eq!(game.progress().pending_spread(), None);
    assert_eq!(game.scheduler().pending(TaskPurpose::SpreadStep), 0);

    let token = events
        .iter()
        .find_map(|event| match event {
            GameEvent::ShowWin { token } => Some(*token),
            _ => None,
        })
        .expect("win transition requested");
    assert_eq!(token.transition(), Transition::Win);
    assert!(!game.press(at(0, 0), &mut events), "input is ignored once won");

    events.clear();
    assert!(game.complete_transition(token));
    game.advance(TRANSITION - Duration::from_millis(1), &mut events);
    assert!(events.is_empty(), "level changes only after the pause");

    game.advance(Duration::from_millis(1), &mut events);
    assert_eq!(game.progress().level().get(), 2);
    assert_eq!(game.phase(), Phase::AwaitingSelection);
    assert!(events.contains(&GameEvent::LevelStarted {
        level: LevelNumber::clamped(2),
        title: "Test 2".to_owned(),
    }));
}

#[test]
fn running_out_of_matches_starts_auto_play() {
    let game = stuck_in_auto_play(NoHaptics, Config::default());

    assert!(game.progress().auto_play());
    assert_eq!(game.phase(), Phase::AutoSpreading);
    assert!(game.progress().pending_spread().is_some());
    assert_eq!(
        query::tile(game.board(), at(0, 2)).map(|tile| tile.status),
        Ok(TileStatus::Malignant)
    );
}

#[test]
fn long_frame_fires_every_due_spread_step() {
    let mut game = stuck_in_auto_play(NoHaptics, Config::default());
    let mut events = Vec::new();

    game.advance(SPREAD * 3, &mut events);

    assert_eq!(spread_steps(&events), 3);
    assert_eq!(game.scheduler().pending(TaskPurpose::SpreadStep), 1);
    assert!(events.iter().all(|event| match event {
        GameEvent::SpreadStepped { outcome, .. } => outcome.auto_play,
        _ => true,
    }));
}

#[test]
fn loss_cancels_spread_vibrates_and_restarts_level() {
    let mut game = stuck_in_auto_play(RecordingHaptics::default(), Config::default());
    let mut events = Vec::new();

    assert!(game.signal_loss(&mut events));
    assert!(!game.signal_loss(&mut events), "a level is lost once");
    assert_eq!(game.phase(), Phase::Lost);
    assert_eq!(game.progress().pending_spread(), None);
    assert_eq!(game.scheduler().pending(TaskPurpose::SpreadStep), 0);
    assert_eq!(game.haptics().requests, vec![Duration::from_millis(500)]);

    let token = game.pending_transition().expect("lose transition requested");
    assert!(events.contains(&GameEvent::ShowLose { token }));

    events.clear();
    game.advance(SPREAD * 10, &mut events);
    assert_eq!(spread_steps(&events), 0, "spreading stops after a loss");

    assert!(game.complete_transition(token));
    game.advance(TRANSITION, &mut events);

    assert_eq!(game.progress().level(), LevelNumber::FIRST);
    assert!(!game.progress().lost());
    assert!(!game.progress().auto_play());
    assert_eq!(game.phase(), Phase::AwaitingSelection);
    assert_eq!(query::count_status(game.board(), TileStatus::Healthy), 3);
    assert_eq!(query::count_status(game.board(), TileStatus::Malignant), 1);
}

#[test]
fn disabled_haptics_are_not_requested() {
    let mut game = stuck_in_auto_play(
        RecordingHaptics::default(),
        Config::default().with_haptics(false),
    );
    let mut events = Vec::new();

    assert!(game.signal_loss(&mut events));
    assert!(game.haptics().requests.is_empty());
}

#[test]
fn haptics_toggled_off_mid_level_stay_silent() {
    let mut game = stuck_in_auto_play(RecordingHaptics::default(), Config::default());
    let mut events = Vec::new();
    assert!(game.config().haptics_enabled());

    game.set_haptics_enabled(false);
    assert!(!game.config().haptics_enabled());
    assert!(game.signal_loss(&mut events));

    assert!(game.haptics().requests.is_empty());
    assert_eq!(game.phase(), Phase::Lost);
}

#[test]
fn haptics_toggled_back_on_vibrate_again() {
    let mut game = stuck_in_auto_play(
        RecordingHaptics::default(),
        Config::default().with_haptics(false),
    );
    let mut events = Vec::new();

    game.set_haptics_enabled(true);
    assert!(game.signal_loss(&mut events));

    assert_eq!(game.haptics().requests, vec![Duration::from_millis(500)]);
}

#[test]
fn zero_spread_delay_still_lets_advance_return() {
    let config = Config::new(Duration::ZERO, TRANSITION);
    assert_eq!(config.spread_delay(), Duration::from_millis(1));

    let mut game = stuck_in_auto_play(NoHaptics, config);
    let mut events = Vec::new();

    game.advance(Duration::from_millis(1), &mut events);
    assert_eq!(spread_steps(&events), 1);

    events.clear();
    game.advance(Duration::from_millis(10), &mut events);
    assert_eq!(spread_steps(&events), 10);
    assert_eq!(game.scheduler().pending(TaskPurpose::SpreadStep), 1);
}

#[test]
fn transition_from_previous_generation_is_ignored() {
    let (mut game, _) = started(&["bbB"], NoHaptics, Config::default());
    let mut events = Vec::new();
    swipe(&mut game, &[at(0, 0), at(0, 1), at(0, 2)], &mut events);
    let _ = game.release(&mut events);
    let token = game.pending_transition().expect("win transition requested");
    let generation = game.progress().generation();

    game.restart_level(&mut events);

    assert_eq!(game.progress().generation(), generation + 1);
    assert!(!game.complete_transition(token));
    assert_eq!(game.scheduler().pending(TaskPurpose::AdvanceLevel), 0);
    assert_eq!(game.phase(), Phase::AwaitingSelection);
}

#[test]
fn transition_token_completes_once() {
    let (mut game, _) = started(&["bbB"], NoHaptics, Config::default());
    let mut events = Vec::new();
    swipe(&mut game, &[at(0, 0), at(0, 1), at(0, 2)], &mut events);
    let _ = game.release(&mut events);
    let token = game.pending_transition().expect("win transition requested");

    assert!(game.complete_transition(token));
    assert!(!game.complete_transition(token));
    assert_eq!(game.scheduler().pending(TaskPurpose::AdvanceLevel), 1);
}

#[test]
fn winning_last_level_exits_to_menu() {
    let (mut game, _) = started(&["bbB"], NoHaptics, Config::default());
    let mut events = Vec::new();
    swipe(&mut game, &[at(0, 0), at(0, 1), at(0, 2)], &mut events);
    let _ = game.release(&mut events);
    let token = game.pending_transition().expect("win transition requested");

    events.clear();
    assert!(game.complete_transition(token));
    game.advance(TRANSITION, &mut events);

    assert_eq!(game.phase(), Phase::Exited);
    assert_eq!(
        events,
        vec![GameEvent::ExitToMenu {
            requested: LevelNumber::clamped(2),
        }]
    );
    assert!(!game.press(at(0, 0), &mut events));
}

#[test]
fn previous_level_never_goes_below_first() {
    let (mut game, _) = started(&["bbB", "bbR"], NoHaptics, Config::default());
    let mut events = Vec::new();

    game.prev_level(&mut events);
    assert_eq!(game.progress().level(), LevelNumber::FIRST);

    game.next_level(&mut events);
    game.prev_level(&mut events);
    assert_eq!(game.progress().level(), LevelNumber::FIRST);
    assert_eq!(game.phase(), Phase::AwaitingSelection);
}

#[test]
fn spread_timer_during_gesture_keeps_dragging() {
    let mut game = stuck_in_auto_play(NoHaptics, Config::default());
    let mut events = Vec::new();

    assert!(game.press(at(0, 2), &mut events));
    game.advance(SPREAD, &mut events);
    assert_eq!(spread_steps(&events), 1);
    assert_eq!(game.phase(), Phase::Dragging);

    assert_eq!(game.release(&mut events), None, "single tile never matches");
    assert_eq!(game.phase(), Phase::AutoSpreading);
    assert!(game.path_tiles().is_empty());
}

#[test]
fn second_release_resolves_nothing() {
    let (mut game, _) = started(&["bbgR\nyyyy"], NoHaptics, Config::default());
    let mut events = Vec::new();
    swipe(&mut game, &[at(0, 0), at(0, 1)], &mut events);

    assert!(game.release(&mut events).is_some());
    assert_eq!(game.release(&mut events), None);
    assert!(!game.drag(at(1, 0), &mut events), "dragging needs a press first");
}

#[test]
fn release_after_player_match_spreads_once() {
    let (mut game, _) = started(&["bbgR\nyyyy"], NoHaptics, Config::default());
    let mut events = Vec::new();
    swipe(&mut game, &[at(0, 0), at(0, 1)], &mut events);
    let _ = game.release(&mut events);

    assert_eq!(spread_steps(&events), 1);
    assert!(!game.progress().auto_play(), "yellow row is still matchable");
    assert_eq!(game.phase(), Phase::AwaitingSelection);
    assert_eq!(
        query::tile(game.board(), at(0, 2)).map(|tile| tile.status),
        Ok(TileStatus::Malignant)
    );
    assert_eq!(
        query::tile(game.board(), at(1, 3)).map(|tile| tile.status),
        Ok(TileStatus::Malignant)
    );
}

#[test]
fn identical_inputs_replay_identically() {
    fn run() -> Vec<GameEvent> {
        let (mut game, mut events) = started(&[STUCK, "bbB"], NoHaptics, Config::default());
        swipe(&mut game, &[at(0, 0), at(0, 1)], &mut events);
        let _ = game.release(&mut events);
        game.advance(SPREAD * 2, &mut events);
        let _ = game.signal_loss(&mut events);
        if let Some(token) = game.pending_transition() {
            let _ = game.complete_transition(token);
        }
        game.advance(TRANSITION, &mut events);
        events
    }

    assert_eq!(run(), run());
}
