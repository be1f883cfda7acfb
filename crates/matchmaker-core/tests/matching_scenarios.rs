// crates/matchmaker-core/tests/matching_scenarios.rs
use matchmaker_core::{
    player_channel, server_channel, AllocatedServer, Matchmaker, PlayerNotifyRx, PlayerRequest,
    ServerNotifyRx, ServerSession, SessionId, TicketId,
};

struct TestServer {
    id: SessionId,
    ticket: TicketId,
    rx: ServerNotifyRx,
}

struct TestPlayer {
    id: SessionId,
    rx: PlayerNotifyRx,
}

fn register(mm: &mut Matchmaker, address: &str, port: u16, capacity: u32) -> TestServer {
    let id = SessionId::new();
    let ticket = TicketId::new();
    let (tx, rx) = server_channel();
    mm.register_server(ServerSession::new(id, ticket, address, port, capacity, tx));
    TestServer { id, ticket, rx }
}

fn request(mm: &mut Matchmaker) -> TestPlayer {
    let id = SessionId::new();
    let (tx, rx) = player_channel();
    mm.connect_player(id);
    mm.request_match(PlayerRequest::new(id, tx));
    TestPlayer { id, rx }
}

fn drain<T>(rx: &mut tokio::sync::mpsc::UnboundedReceiver<T>) -> Vec<T> {
    let mut out = Vec::new();
    while let Ok(v) = rx.try_recv() {
        out.push(v);
    }
    out
}

#[test]
fn server_appears_at_most_once_in_pool() {
    let mut mm = Matchmaker::new();
    let ids: Vec<SessionId> = (0..4).map(|_| SessionId::new()).collect();
    let (tx, _rx) = server_channel();

    // Interleave registrations and unregistrations over a small id set.
    for step in 0..40usize {
        let id = ids[(step * 7 + 3) % ids.len()];
        if step % 3 == 2 {
            mm.unregister_server(id);
        } else {
            mm.register_server(ServerSession::new(id, TicketId::new(), "h", 1, 4, tx.clone()));
        }

        for id in &ids {
            let n = mm.available_servers().filter(|s| s.session_id == *id).count();
            assert!(n <= 1, "server {} appears {} times at step {}", id, n, step);
        }
    }
}

#[test]
fn player_count_tracks_roster() {
    let mut mm = Matchmaker::new();
    let ids: Vec<SessionId> = (0..5).map(|_| SessionId::new()).collect();

    for step in 0..50usize {
        let id = ids[(step * 3 + 1) % ids.len()];
        if step % 4 == 3 {
            mm.disconnected_player(id);
        } else {
            mm.connect_player(id);
        }

        let active = ids.iter().filter(|id| mm.is_player_active(**id)).count();
        assert_eq!(mm.player_count(), active);
    }
}

#[test]
fn full_capacity_in_one_pass() {
    let mut mm = Matchmaker::new();
    let mut server = register(&mut mm, "203.0.113.5", 7000, 4);
    let mut players: Vec<TestPlayer> = (0..4).map(|_| request(&mut mm)).collect();

    assert_eq!(mm.run_matching_pass(), 4);

    assert!(mm.server(server.id).is_none());
    assert_eq!(mm.num_pending_requests(), 0);

    let expected = AllocatedServer {
        ticket_id: server.ticket,
        address: "203.0.113.5".to_string(),
        port: 7000,
    };
    let mut counts = Vec::new();
    for player in players.iter_mut() {
        let received = drain(&mut player.rx);
        assert!(received.iter().all(|a| *a == expected), "player {}", player.id);
        counts.push(received.len());
    }
    // Players matched earlier in the pass are re-sent the same value;
    // the last one to join hears exactly once.
    assert_eq!(counts, vec![4, 3, 2, 1]);

    assert_eq!(drain(&mut server.rx), vec![server.ticket]);
}

#[test]
fn each_player_sees_one_notification_per_later_match() {
    let mut mm = Matchmaker::new();
    let _server = register(&mut mm, "h", 1, 3);
    let mut players: Vec<TestPlayer> = (0..3).map(|_| request(&mut mm)).collect();

    mm.run_matching_pass();

    let counts: Vec<usize> = players.iter_mut().map(|p| drain(&mut p.rx).len()).collect();
    assert_eq!(counts, vec![3, 2, 1]);
}

#[test]
fn under_capacity_server_stays_available() {
    let mut mm = Matchmaker::new();
    let mut server = register(&mut mm, "h", 1, 2);
    let mut player = request(&mut mm);

    assert_eq!(mm.run_matching_pass(), 1);

    assert!(mm.server(server.id).is_some());
    assert_eq!(drain(&mut player.rx).len(), 1);
    assert!(drain(&mut server.rx).is_empty());
}

#[test]
fn fifo_across_two_servers() {
    for k in 1..=5 {
        let mut mm = Matchmaker::new();
        let s1 = register(&mut mm, "s1", 1, 2);
        let s2 = register(&mut mm, "s2", 2, 3);
        let players: Vec<TestPlayer> = (0..k).map(|_| request(&mut mm)).collect();

        mm.run_matching_pass();

        let assigned = |id: SessionId| -> Option<Vec<SessionId>> {
            mm.server(id)
                .map(|s| s.players().iter().map(|p| p.session_id).collect())
        };
        let expected_s1: Vec<SessionId> = players.iter().take(2).map(|p| p.id).collect();
        let expected_s2: Vec<SessionId> = players.iter().skip(2).map(|p| p.id).collect();

        if k < 2 {
            assert_eq!(assigned(s1.id), Some(expected_s1), "k={}", k);
        } else {
            assert!(assigned(s1.id).is_none(), "s1 should be filled with k={}", k);
        }

        if k < 5 {
            assert_eq!(assigned(s2.id), Some(expected_s2), "k={}", k);
        } else {
            assert!(assigned(s2.id).is_none(), "s2 should be filled with k={}", k);
        }
    }
}

#[test]
fn fifo_allocations_carry_the_right_ticket() {
    let mut mm = Matchmaker::new();
    let s1 = register(&mut mm, "s1", 1, 1);
    let s2 = register(&mut mm, "s2", 2, 1);
    let mut r1 = request(&mut mm);
    let mut r2 = request(&mut mm);

    assert_eq!(mm.run_matching_pass(), 2);

    assert_eq!(drain(&mut r1.rx)[0].ticket_id, s1.ticket);
    assert_eq!(drain(&mut r2.rx)[0].ticket_id, s2.ticket);
}

#[test]
fn reregistration_preserves_assigned_players() {
    let mut mm = Matchmaker::new();
    let server = register(&mut mm, "h", 1, 3);
    let p = request(&mut mm);
    mm.run_matching_pass();

    let (tx, _rx) = server_channel();
    mm.register_server(ServerSession::new(server.id, TicketId::new(), "h2", 2, 3, tx));

    assert_eq!(mm.available_servers().count(), 1);
    let players: Vec<SessionId> = mm
        .server(server.id)
        .unwrap()
        .players()
        .iter()
        .map(|r| r.session_id)
        .collect();
    assert_eq!(players, vec![p.id]);
}

#[test]
fn disconnect_reopens_a_slot() {
    let mut mm = Matchmaker::new();
    let mut server = register(&mut mm, "h", 1, 2);

    let first = request(&mut mm);
    mm.run_matching_pass();
    mm.disconnected_player(first.id);
    assert!(mm.server(server.id).unwrap().players().is_empty());

    // One more match would have filled it before the disconnect.
    let second = request(&mut mm);
    mm.run_matching_pass();
    assert!(mm.server(server.id).is_some());
    assert!(drain(&mut server.rx).is_empty());

    let third = request(&mut mm);
    mm.run_matching_pass();
    assert!(mm.server(server.id).is_none());
    assert_eq!(drain(&mut server.rx), vec![server.ticket]);

    assert_ne!(second.id, third.id);
}

#[test]
fn unregister_missing_server_is_noop() {
    let mut mm = Matchmaker::new();
    let _server = register(&mut mm, "h", 1, 1);
    mm.unregister_server(SessionId::new());
    assert_eq!(mm.snapshot().servers.len(), 1);
}

#[test]
fn snapshot_reflects_pool() {
    let mut mm = Matchmaker::new();
    let server = register(&mut mm, "198.51.100.7", 9000, 4);
    let _p = request(&mut mm);
    let _q = request(&mut mm);
    mm.run_matching_pass();

    let snap = mm.snapshot();
    assert_eq!(snap.player_count, 2);
    assert_eq!(snap.pending_requests, 0);
    assert_eq!(snap.servers.len(), 1);
    assert_eq!(snap.servers[0].session_id, server.id);
    assert_eq!(snap.servers[0].players, 2);
    assert_eq!(snap.servers[0].capacity, 4);
}
