mod support;

use robo_session_core::{MessageKind, MessagePayload, NetworkMessage, ShotEvent, Vec2};
use robo_session_p2p::{Delivery, InviteToken, NetworkConnection, SessionError};
use support::{Inbox, SessionFixture};

fn shot() -> MessagePayload {
    MessagePayload::PlayerShot(ShotEvent {
        x: 10.0,
        y: 20.0,
        angle: 0.5,
        weapon: None,
        color: None,
    })
}

#[tokio::test]
async fn test_relay_excludes_sender() {
    let mut fixture = SessionFixture::new().await;
    fixture.add_guest(None).await;
    fixture.add_guest(None).await;
    fixture.add_guest(None).await;

    let host_inbox = Inbox::attach(&mut fixture.host);
    let inboxes: Vec<Inbox> = fixture.guests.iter_mut().map(Inbox::attach).collect();
    let shooter = fixture.guest_id(0);

    fixture.guests[0].send(shot()).unwrap();
    fixture.pump();

    assert_eq!(host_inbox.count(MessageKind::PlayerShot), 1);
    assert_eq!(inboxes[0].count(MessageKind::PlayerShot), 0);
    for inbox in &inboxes[1..] {
        let shots = inbox.of_kind(MessageKind::PlayerShot);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].sender_id(), &shooter);
    }
}

#[tokio::test]
async fn test_host_messages_reach_every_guest() {
    let mut fixture = SessionFixture::new().await;
    fixture.add_guest(None).await;
    fixture.add_guest(None).await;
    let inboxes: Vec<Inbox> = fixture.guests.iter_mut().map(Inbox::attach).collect();

    fixture.host.send(shot()).unwrap();
    fixture.pump();

    for inbox in &inboxes {
        assert_eq!(inbox.count(MessageKind::PlayerShot), 1);
    }
}

#[tokio::test]
async fn test_host_only_message_from_guest_dropped() {
    let mut fixture = SessionFixture::new().await;
    fixture.add_guest(None).await;
    fixture.add_guest(None).await;
    let host_inbox = Inbox::attach(&mut fixture.host);
    let other = Inbox::attach(&mut fixture.guests[1]);

    fixture.guests[0]
        .send(MessagePayload::GameStart { spawn: Vec2::ZERO })
        .unwrap();
    fixture.pump();

    assert_eq!(host_inbox.count(MessageKind::GameStart), 0);
    assert_eq!(other.count(MessageKind::GameStart), 0);
    assert!(!fixture.host.lifecycle().is_running());
    assert!(!fixture.guests[1].lifecycle().is_running());
}

#[tokio::test]
async fn test_malformed_and_spoofed_messages_dropped() {
    let mut fixture = SessionFixture::new().await;
    let host_inbox = Inbox::attach(&mut fixture.host);
    let host_peer = fixture.host.local_peer().unwrap();

    let token: InviteToken = fixture.invite.parse().unwrap();
    let mut raw = fixture.network.join(token.room.as_str());
    let raw_id = raw.local_peer_id().unwrap().participant_id();
    fixture.host.poll();
    assert_eq!(fixture.host.roster().len(), 2);

    raw.send_to(host_peer, b"{\"type\":".to_vec(), Delivery::Reliable)
        .unwrap();
    let spoofed = NetworkMessage::new("somebody-else".into(), shot(), 0);
    raw.send_to(host_peer, spoofed.encode().unwrap(), Delivery::Unreliable)
        .unwrap();
    fixture.host.poll();

    assert_eq!(host_inbox.count(MessageKind::PlayerShot), 0);
    assert!(fixture.host.is_connected());

    let honest = NetworkMessage::new(raw_id.clone(), shot(), 0);
    raw.send_to(host_peer, honest.encode().unwrap(), Delivery::Unreliable)
        .unwrap();
    fixture.host.poll();

    let shots = host_inbox.of_kind(MessageKind::PlayerShot);
    assert_eq!(shots.len(), 1);
    assert_eq!(shots[0].sender_id(), &raw_id);
}

#[tokio::test]
async fn test_guest_cannot_rename_others() {
    let mut fixture = SessionFixture::new().await;
    fixture.add_guest(None).await;
    fixture.add_guest(None).await;
    let victim = fixture.guest_id(1);

    fixture.guests[0]
        .send(MessagePayload::PlayerNameChange {
            id: victim.clone(),
            name: "Mallory".to_string(),
        })
        .unwrap();
    fixture.pump();

    assert_eq!(
        fixture.host.roster().get(&victim).unwrap().display_name(),
        "Player 3"
    );
    assert_eq!(
        fixture.guests[1].roster().get(&victim).unwrap().display_name(),
        "Player 3"
    );
}

#[tokio::test]
async fn test_fifth_participant_rejected() {
    let mut fixture = SessionFixture::new().await;
    for _ in 0..3 {
        fixture.add_guest(None).await;
    }
    assert_eq!(fixture.host.roster().len(), 4);

    let (rejected, result) = fixture.connect(None).await;

    assert!(matches!(result, Err(SessionError::RoomFull)));
    assert!(!rejected.is_connected());
    fixture.pump();
    assert_eq!(fixture.host.roster().len(), 4);
    for guest in &fixture.guests {
        assert_eq!(guest.roster().len(), 4);
        assert!(guest.is_connected());
    }
}

#[tokio::test]
async fn test_guest_cannot_free_its_own_slot() {
    let mut fixture = SessionFixture::new().await;
    for _ in 0..3 {
        fixture.add_guest(None).await;
    }
    let quitter = fixture.guest_id(0);

    fixture.guests[0]
        .send(MessagePayload::PlayerDisconnected { id: quitter.clone() })
        .unwrap();
    fixture.pump();

    assert_eq!(fixture.host.roster().len(), 4);
    assert!(fixture.host.roster().get(&quitter).is_some());

    let (rejected, result) = fixture.connect(None).await;
    assert!(matches!(result, Err(SessionError::RoomFull)));
    assert!(!rejected.is_connected());
    fixture.pump();
    assert_eq!(fixture.host.roster().len(), 4);
}

#[tokio::test]
async fn test_transport_failure_closes_guest() {
    let mut fixture = SessionFixture::new().await;
    let g = fixture.add_guest(None).await;
    let peer = fixture.guests[g].local_peer().unwrap();

    fixture.network.fail(peer, "ice connection failed");
    fixture.pump();

    assert!(!fixture.guests[g].is_connected());
    assert_eq!(fixture.host.roster().len(), 1);
    assert!(matches!(
        fixture.guests[g].send(shot()),
        Err(SessionError::NotConnected)
    ));
}
