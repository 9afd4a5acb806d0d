use contagion_board::{apply, query, Board};
use contagion_core::{
    Adjacency, Command, LevelTemplate, Match, TileKind, TilePosition, TileStatus,
};
use contagion_system_matching::MatchEngine;
use proptest::prelude::*;

const MIXED_LAYOUT: &str = "
    bbbr
    bBgr
    ggg.
    ybyy
";

fn board_from(layout: &str, adjacency: Adjacency) -> Board {
    let template = LevelTemplate::from_ascii("Matching", adjacency, layout).expect("layout parses");
    Board::from_template(&template)
}

fn select_all(engine: &mut MatchEngine, board: &Board, positions: &[(u32, u32)]) -> Vec<bool> {
    positions
        .iter()
        .map(|(row, column)| {
            engine.select_tile(query::tile_view(board), TilePosition::new(*row, *column))
        })
        .collect()
}

fn resolve(engine: &mut MatchEngine, board: &mut Board) -> Option<Match> {
    let mut commands = Vec::new();
    let outcome = engine.resolve_match(query::tile_view(board), &mut commands);
    engine.clear_path();
    let mut events = Vec::new();
    for command in commands {
        apply(board, command, &mut events);
    }
    outcome
}

#[test]
fn straight_blue_match_removes_exactly_the_path() {
    let mut board = board_from(MIXED_LAYOUT, Adjacency::Orthogonal);
    let mut engine = MatchEngine::new();
    let malignant_before = query::count_status(&board, TileStatus::Malignant);

    let accepted = select_all(&mut engine, &board, &[(0, 0), (0, 1), (0, 2)]);
    assert_eq!(accepted, vec![true, true, true]);

    let resolved = resolve(&mut engine, &mut board).expect("three tiles match");
    assert_eq!(resolved.kind(), TileKind::Blue);
    assert_eq!(resolved.count(), 3);
    assert_eq!(resolved.cured(), 0);

    let removed: Vec<_> = query::tiles_where(&board, |tile| tile.status == TileStatus::Removed)
        .into_iter()
        .map(|tile| tile.position)
        .collect();
    assert_eq!(
        removed,
        vec![
            TilePosition::new(0, 0),
            TilePosition::new(0, 1),
            TilePosition::new(0, 2),
        ]
    );
    assert_eq!(
        query::count_status(&board, TileStatus::Malignant),
        malignant_before
    );
}

#[test]
fn single_tile_path_resolves_to_nothing() {
    let mut board = board_from(MIXED_LAYOUT, Adjacency::Orthogonal);
    let mut engine = MatchEngine::new();

    assert_eq!(select_all(&mut engine, &board, &[(0, 0)]), vec![true]);
    assert_eq!(resolve(&mut engine, &mut board), None);
    assert_eq!(query::count_status(&board, TileStatus::Removed), 0);
}

#[test]
fn malignant_tiles_are_cured_by_matching() {
    let mut board = board_from(MIXED_LAYOUT, Adjacency::Orthogonal);
    let mut engine = MatchEngine::new();

    let accepted = select_all(&mut engine, &board, &[(1, 0), (1, 1), (0, 1)]);
    assert_eq!(accepted, vec![true, true, true]);

    let resolved = resolve(&mut engine, &mut board).expect("match resolves");
    assert_eq!(resolved.cured(), 1);
    assert_eq!(query::count_status(&board, TileStatus::Malignant), 0);
}

#[test]
fn rejected_candidates_do_not_end_the_gesture() {
    let board = board_from(MIXED_LAYOUT, Adjacency::Orthogonal);
    let mut engine = MatchEngine::new();

    // (0,3) is red, (2,2) is not adjacent, (0,1) is already the last tile.
    let accepted = select_all(
        &mut engine,
        &board,
        &[(0, 0), (0, 1), (0, 3), (2, 2), (0, 1), (0, 2)],
    );

    assert_eq!(accepted, vec![true, true, false, false, false, true]);
    assert_eq!(
        engine.path(),
        &[
            TilePosition::new(0, 0),
            TilePosition::new(0, 1),
            TilePosition::new(0, 2),
        ]
    );
}

#[test]
fn backtracking_shortens_and_reselecting_restores() {
    let board = board_from(MIXED_LAYOUT, Adjacency::Orthogonal);
    let mut engine = MatchEngine::new();
    let _ = select_all(&mut engine, &board, &[(0, 0), (0, 1), (0, 2)]);
    let full_path = engine.path().to_vec();

    assert!(engine.select_tile(query::tile_view(&board), TilePosition::new(0, 1)));
    assert_eq!(engine.path(), &full_path[..2]);

    assert!(engine.select_tile(query::tile_view(&board), TilePosition::new(0, 2)));
    assert_eq!(engine.path(), full_path.as_slice());
}

#[test]
fn removed_tiles_cannot_be_selected() {
    let mut board = board_from(MIXED_LAYOUT, Adjacency::Orthogonal);
    let mut events = Vec::new();
    apply(
        &mut board,
        Command::RemoveTiles {
            positions: vec![TilePosition::new(0, 0), TilePosition::new(0, 2)],
        },
        &mut events,
    );
    let mut engine = MatchEngine::new();

    assert_eq!(
        select_all(&mut engine, &board, &[(0, 0), (0, 1), (0, 2)]),
        vec![false, true, false]
    );
}

#[test]
fn resolution_consumes_the_path() {
    let mut board = board_from(MIXED_LAYOUT, Adjacency::Orthogonal);
    let mut engine = MatchEngine::new();
    let _ = select_all(&mut engine, &board, &[(2, 0), (2, 1), (2, 2)]);

    let mut commands = Vec::new();
    let first = engine.resolve_match(query::tile_view(&board), &mut commands);
    let second = engine.resolve_match(query::tile_view(&board), &mut commands);

    assert!(first.is_some());
    assert_eq!(second, None);
    assert_eq!(commands.len(), 1, "only one removal may be emitted");

    let mut events = Vec::new();
    for command in commands {
        apply(&mut board, command, &mut events);
    }
    assert_eq!(query::count_status(&board, TileStatus::Removed), 3);
}

proptest! {
    #[test]
    fn selection_paths_keep_their_invariants(
        octile in any::<bool>(),
        steps in proptest::collection::vec((0u32..5, 0u32..5), 1..40),
    ) {
        let adjacency = if octile { Adjacency::Octile } else { Adjacency::Orthogonal };
        let board = board_from(MIXED_LAYOUT, adjacency);
        let view = query::tile_view(&board);
        let mut engine = MatchEngine::new();

        for (row, column) in steps {
            let _ = engine.select_tile(view, TilePosition::new(row, column));

            let tiles = engine.tiles_in_match(view);
            prop_assert_eq!(tiles.len(), engine.path().len());
            for tile in &tiles {
                prop_assert!(tile.status.is_live());
                prop_assert_eq!(tile.kind, tiles[0].kind);
            }
            for pair in tiles.windows(2) {
                prop_assert!(adjacency.are_adjacent(pair[0].position, pair[1].position));
            }
            let mut positions = engine.path().to_vec();
            positions.sort();
            positions.dedup();
            prop_assert_eq!(positions.len(), engine.path().len());
        }
    }
}
