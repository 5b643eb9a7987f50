mod common;

use seabattle::{
    Board, Cell, ClientMessage, ConnId, Dispatch, JoinRejectReason, MatchMode, MemoryStats, Phase, PlacementError,
    PlacementPolicy, PlayerId, PlayerIdentity, RoomId, ServerMessage, SessionManager,
};

const A: ConnId = ConnId(1);
const B: ConnId = ConnId(2);

fn manager() -> SessionManager {
    SessionManager::new(PlacementPolicy::Validate, Box::new(MemoryStats::new()))
}

fn matchmake(id: &str) -> ClientMessage {
    ClientMessage::Matchmake {
        mode: MatchMode::Random,
        room: None,
        player: PlayerIdentity::new(id, id.to_uppercase()),
    }
}

fn shot(room: &RoomId, row: u8, col: u8) -> ClientMessage {
    ClientMessage::SubmitShot {
        room: room.clone(),
        row,
        col,
    }
}

fn to(out: &[Dispatch], conn: ConnId) -> Vec<ServerMessage> {
    out.iter().filter(|d| d.conn == conn).map(|d| d.msg.clone()).collect()
}

/// Pair `a` (first, moves first) with `b` and play both placements.
fn started() -> (SessionManager, RoomId) {
    let mut mgr = manager();
    assert!(mgr.handle(A, matchmake("a")).is_empty());
    let out = mgr.handle(B, matchmake("b"));
    let room = match &to(&out, A)[..] {
        [ServerMessage::Paired { room, opponent }] => {
            assert_eq!(opponent.id, PlayerId::from("b"));
            room.clone()
        }
        other => panic!("expected Paired, got {:?}", other),
    };
    let (board, _) = common::fixed_layout();
    for conn in [A, B] {
        mgr.handle(
            conn,
            ClientMessage::SubmitPlacement {
                room: room.clone(),
                board,
            },
        );
    }
    assert_eq!(mgr.room(&room).map(|s| s.phase().clone()), Some(Phase::InProgress));
    (mgr, room)
}

#[test]
fn test_pairing_and_placement_flow() {
    let mut mgr = manager();
    mgr.handle(A, matchmake("a"));
    let out = mgr.handle(B, matchmake("b"));
    assert_eq!(out.len(), 2);
    let room = mgr.room_of(A).cloned().unwrap();
    assert_eq!(mgr.room_of(B), Some(&room));
    assert_eq!(mgr.room(&room).unwrap().turn_owner(), &PlayerId::from("a"));

    let (board, _) = common::fixed_layout();
    let out = mgr.handle(A, ClientMessage::SubmitPlacement { room: room.clone(), board });
    assert_eq!(to(&out, A), vec![ServerMessage::ReadyConfirmed]);
    assert_eq!(to(&out, B), vec![ServerMessage::PeerReady]);

    // a second placement from the same slot is ignored
    assert!(mgr.handle(A, ClientMessage::SubmitPlacement { room: room.clone(), board }).is_empty());

    let out = mgr.handle(B, ClientMessage::SubmitPlacement { room: room.clone(), board });
    match &to(&out, A)[..] {
        [ServerMessage::PeerReady, ServerMessage::MatchStart { own_board, opponent_view, is_my_turn }] => {
            assert!(*is_my_turn);
            assert_eq!(*own_board, board);
            assert_eq!(*opponent_view, Board::new());
        }
        other => panic!("unexpected messages for A: {:?}", other),
    }
    match &to(&out, B)[..] {
        [ServerMessage::ReadyConfirmed, ServerMessage::MatchStart { is_my_turn, .. }] => assert!(!*is_my_turn),
        other => panic!("unexpected messages for B: {:?}", other),
    }
}

#[test]
fn test_invalid_placement_is_rejected_and_can_be_retried() {
    let mut mgr = manager();
    mgr.handle(A, matchmake("a"));
    mgr.handle(B, matchmake("b"));
    let room = mgr.room_of(A).cloned().unwrap();

    let out = mgr.handle(A, ClientMessage::SubmitPlacement { room: room.clone(), board: Board::new() });
    assert_eq!(
        out,
        vec![Dispatch::new(A, ServerMessage::PlacementRejected { reason: PlacementError::WrongComposition })]
    );

    let (board, _) = common::fixed_layout();
    let out = mgr.handle(A, ClientMessage::SubmitPlacement { room: room.clone(), board });
    assert_eq!(to(&out, A), vec![ServerMessage::ReadyConfirmed]);
}

#[test]
fn test_trusted_placement_accepts_any_grid() {
    let mut mgr = SessionManager::new(PlacementPolicy::Trust, Box::new(MemoryStats::new()));
    mgr.handle(A, matchmake("a"));
    mgr.handle(B, matchmake("b"));
    let room = mgr.room_of(A).cloned().unwrap();

    let mut board = Board::new();
    board.set(0, 0, Cell::Ship).unwrap();
    let out = mgr.handle(A, ClientMessage::SubmitPlacement { room, board });
    assert_eq!(to(&out, A), vec![ServerMessage::ReadyConfirmed]);
}

#[test]
fn test_turn_changes_exactly_on_misses() {
    let (mut mgr, room) = started();
    let turn = |mgr: &SessionManager| mgr.room(&room).unwrap().turn_owner().clone();
    let (a, b) = (PlayerId::from("a"), PlayerId::from("b"));

    // (conn, row, col, hit)
    let script = [
        (A, 0, 0, true),
        (A, 0, 1, true),
        (A, 9, 9, false),
        (B, 2, 4, true),
        (B, 8, 8, false),
        (A, 9, 8, false),
        (B, 7, 7, false),
    ];
    let mut expected = a.clone();
    for (conn, r, c, hit) in script {
        let out = mgr.handle(conn, shot(&room, r, c));
        let result = out.iter().find_map(|d| match &d.msg {
            ServerMessage::ShotResult { hit, .. } => Some(*hit),
            _ => None,
        });
        assert_eq!(result, Some(hit), "shot at ({r},{c})");
        let turn_changes = out.iter().filter(|d| matches!(d.msg, ServerMessage::TurnChanged { .. })).count();
        if hit {
            assert_eq!(turn_changes, 0);
        } else {
            expected = if expected == a { b.clone() } else { a.clone() };
            assert_eq!(turn_changes, 2);
        }
        assert_eq!(turn(&mgr), expected);
    }
}

#[test]
fn test_out_of_turn_shot_is_ignored() {
    let (mut mgr, room) = started();
    let before = mgr.room(&room).unwrap().clone();

    assert!(mgr.handle(B, shot(&room, 0, 0)).is_empty());

    let after = mgr.room(&room).unwrap();
    assert_eq!(after.turn_owner(), before.turn_owner());
    let board_of = |s: &seabattle::MatchSession, conn| *s.slot_of(conn).unwrap().board().unwrap();
    assert_eq!(board_of(after, A), board_of(&before, A));
    assert_eq!(board_of(after, B), board_of(&before, B));
}

#[test]
fn test_repeated_and_foreign_shots_are_ignored() {
    let (mut mgr, room) = started();
    assert_eq!(mgr.handle(A, shot(&room, 0, 0)).len(), 2);
    assert!(mgr.handle(A, shot(&room, 0, 0)).is_empty());
    assert!(mgr.handle(A, shot(&room, 10, 0)).is_empty());
    assert!(mgr.handle(A, shot(&RoomId("elsewhere".into()), 1, 1)).is_empty());
    // a connection that never matchmade
    assert!(mgr.handle(ConnId(99), shot(&room, 1, 1)).is_empty());
}

#[test]
fn test_sinking_a_single_reveals_its_ring() {
    let (mut mgr, room) = started();
    let out = mgr.handle(A, shot(&room, 4, 5));
    let expected = ServerMessage::ShotResult {
        row: 4,
        col: 5,
        hit: true,
        sunk: true,
        sunk_cells: vec![(4, 5)],
        shooter: PlayerId::from("a"),
        game_over: false,
        winner: None,
    };
    assert_eq!(to(&out, A), vec![expected.clone()]);
    assert_eq!(to(&out, B), vec![expected]);

    let target = *mgr.room(&room).unwrap().slot_of(B).unwrap().board().unwrap();
    let view = target.opponent_view();
    assert_eq!(view.get(4, 5), Some(Cell::Sunk));
    for (r, c) in Board::coords() {
        let ring = r.abs_diff(4) <= 1 && c.abs_diff(5) <= 1 && (r, c) != (4, 5);
        let want = if ring { Cell::Miss } else if (r, c) == (4, 5) { Cell::Sunk } else { Cell::Empty };
        assert_eq!(view.get(r, c), Some(want), "({r},{c})");
    }
}

#[test]
fn test_game_over_records_stats_and_closes_room() {
    let (mut mgr, room) = started();
    let cells = common::fixed_ship_cells();
    let mut last = Vec::new();
    for (r, c) in cells.iter().copied() {
        last = mgr.handle(A, shot(&room, r as u8, c as u8));
    }
    match &to(&last, B)[..] {
        [ServerMessage::ShotResult { game_over, winner, .. }] => {
            assert!(*game_over);
            assert_eq!(winner.as_ref(), Some(&PlayerId::from("a")));
        }
        other => panic!("expected final ShotResult, got {:?}", other),
    }
    assert!(mgr.room(&room).is_none());
    assert_eq!(mgr.room_of(A), None);
    assert_eq!(mgr.status().rooms, 0);

    let a = mgr.stats().player(&PlayerId::from("a")).unwrap();
    assert_eq!((a.wins, a.losses, a.shots, a.hits), (1, 0, 20, 20));
    let b = mgr.stats().player(&PlayerId::from("b")).unwrap();
    assert_eq!((b.wins, b.losses, b.shots), (0, 1, 0));
    assert_eq!(b.name, "B");

    // the finished room takes no more shots
    assert!(mgr.handle(B, shot(&room, 0, 0)).is_empty());
}

#[test]
fn test_disconnect_mid_game_forfeits_once() {
    let (mut mgr, room) = started();
    mgr.handle(A, shot(&room, 9, 9));

    let out = mgr.disconnect(B);
    assert_eq!(out, vec![Dispatch::new(A, ServerMessage::OpponentLeft)]);
    assert!(mgr.room(&room).is_none());

    let a = mgr.stats().player(&PlayerId::from("a")).unwrap();
    assert_eq!((a.wins, a.losses), (1, 0));
    let b = mgr.stats().player(&PlayerId::from("b")).unwrap();
    assert_eq!((b.wins, b.losses), (0, 1));

    // teardown of the same room again changes nothing
    assert!(mgr.disconnect(B).is_empty());
    assert!(mgr.disconnect(A).is_empty());
    assert_eq!(mgr.stats().player(&PlayerId::from("a")).unwrap().wins, 1);
}

#[test]
fn test_session_forfeit_sets_winner() {
    let (mut mgr, room) = started();
    let mut session = mgr.room(&room).unwrap().clone();
    let out = session.forfeit(A);
    assert_eq!(out, vec![Dispatch::new(B, ServerMessage::OpponentLeft)]);
    assert_eq!(session.phase(), &Phase::Finished { winner: Some(PlayerId::from("b")) });
    assert!(session.forfeit(B).is_empty());
    assert!(session.submit_shot(A, 0, 0).is_empty());
    // the manager's copy is untouched
    assert_eq!(mgr.room(&room).unwrap().phase(), &Phase::InProgress);
    assert!(mgr.disconnect(ConnId(42)).is_empty());
}

#[test]
fn test_disconnect_while_waiting_in_pool() {
    let mut mgr = manager();
    mgr.handle(A, matchmake("a"));
    assert_eq!(mgr.status().waiting, 1);
    assert!(mgr.disconnect(A).is_empty());
    assert_eq!(mgr.status().waiting, 0);

    // the next player does not get paired with the departed one
    assert!(mgr.handle(B, matchmake("b")).is_empty());
    assert_eq!(mgr.status().waiting, 1);
}

#[test]
fn test_friend_room_creator_leaving_removes_room() {
    let mut mgr = manager();
    let out = mgr.handle(
        A,
        ClientMessage::Matchmake {
            mode: MatchMode::Friend,
            room: None,
            player: PlayerIdentity::new("a", "A"),
        },
    );
    let room = match &out[..] {
        [Dispatch { conn, msg: ServerMessage::RoomCreated { room } }] if *conn == A => room.clone(),
        other => panic!("expected RoomCreated, got {:?}", other),
    };
    assert_eq!(mgr.room(&room).unwrap().phase(), &Phase::AwaitingOpponent);
    // nothing to place against yet
    let (board, _) = common::fixed_layout();
    assert!(mgr.handle(A, ClientMessage::SubmitPlacement { room: room.clone(), board }).is_empty());

    assert!(mgr.disconnect(A).is_empty());
    assert!(mgr.room(&room).is_none());
    let a = mgr.stats().player(&PlayerId::from("a")).unwrap();
    assert_eq!(a.games(), 0);

    let out = mgr.handle(
        B,
        ClientMessage::Matchmake {
            mode: MatchMode::Friend,
            room: Some(room),
            player: PlayerIdentity::new("b", "B"),
        },
    );
    assert_eq!(
        to(&out, B),
        vec![ServerMessage::JoinRejected { reason: JoinRejectReason::NotFound }]
    );
}

#[test]
fn test_hello_and_status() {
    let mut mgr = manager();
    let out = mgr.handle(A, ClientMessage::Hello { version: seabattle::PROTOCOL_VERSION });
    assert_eq!(
        out,
        vec![Dispatch::new(A, ServerMessage::Welcome { version: seabattle::PROTOCOL_VERSION })]
    );
    mgr.handle(A, matchmake("a"));
    match &mgr.handle(B, ClientMessage::Status)[..] {
        [Dispatch { msg: ServerMessage::Status { rooms, waiting, .. }, .. }] => {
            assert_eq!((*rooms, *waiting), (0, 1));
        }
        other => panic!("expected Status, got {:?}", other),
    }
}

#[test]
fn test_duplicate_matchmake_is_ignored() {
    let mut mgr = manager();
    mgr.handle(A, matchmake("a"));
    assert!(mgr.handle(A, matchmake("a")).is_empty());
    assert_eq!(mgr.status().waiting, 1);
}
