//! Integration tests for the score pipeline
//!
//! Records live messages to disk, plays the file back through a loopback
//! sink, and round-trips scores through the script format.

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::path::Path;

    use crate::codec::{ScoreReader, StreamEnd};
    use crate::config::{self, Config};
    use crate::player::{Diagnostic, Player, PlayerConfig, PlayerState, TickReport};
    use crate::recorder::{Recorder, RecorderConfig};
    use crate::script::{self, ScoreScript};
    use crate::test_utils::reference_messages;
    use crate::types::{Message, Packet};

    // ============================================================================
    // Helpers
    // ============================================================================

    /// Record the reference messages at frames 0, 1, 3, 6 and 6
    fn record_reference(path: &Path) {
        let config = RecorderConfig {
            generator: "sketch_0412".to_string(),
        };
        let mut recorder = Recorder::create(path, config).unwrap();
        for (frame, msg) in [0, 1, 3, 6, 6].into_iter().zip(reference_messages()) {
            recorder.record_event(frame, msg).unwrap();
        }
        recorder.shutdown().unwrap();
        assert_eq!(recorder.records_written(), 4);
    }

    /// Tick until the player is exhausted, returning (clock, packet) pairs
    fn play_out<R: std::io::Read + std::io::Seek>(
        player: &mut Player<R, Vec<Packet>>,
    ) -> Vec<(i64, Packet)> {
        let mut log = Vec::new();
        for _ in 0..100 {
            if player.current_state() == PlayerState::Exhausted {
                break;
            }
            tick_logged(player, &mut log);
        }
        log
    }

    /// Tick once, appending every delivered packet to `log` with its clock
    fn tick_logged<R: std::io::Read + std::io::Seek>(
        player: &mut Player<R, Vec<Packet>>,
        log: &mut Vec<(i64, Packet)>,
    ) -> TickReport {
        let before = player.sink().len();
        let report = player.tick();
        for packet in &player.sink()[before..] {
            log.push((report.clock, packet.clone()));
        }
        report
    }

    // ============================================================================
    // Record -> Play
    // ============================================================================

    #[test]
    fn test_record_then_play() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take1.oscs");
        record_reference(&path);

        let mut player = Player::open(&path, Vec::<Packet>::new(), PlayerConfig::default()).unwrap();
        assert_eq!(player.header().unwrap().generator, "sketch_0412");

        let log = play_out(&mut player);
        let clocks: Vec<i64> = log.iter().map(|(clock, _)| *clock).collect();
        assert_eq!(clocks, [0, 1, 3, 6]);

        let messages = reference_messages();
        assert_eq!(log[0].1, Packet::Single(messages[0].clone()));
        assert_eq!(log[2].1, Packet::Single(messages[2].clone()));
        assert!(log[3].1.is_bundle());
        assert_eq!(log[3].1.messages(), &messages[3..]);
        assert_eq!(player.delivered(), 4);
    }

    #[test]
    fn test_replay_after_rewind_matches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take2.oscs");
        record_reference(&path);

        let mut player = Player::open(&path, Vec::<Packet>::new(), PlayerConfig { lookahead: 1 }).unwrap();
        let first = play_out(&mut player);

        player.rewind().unwrap();
        player.sink_mut().clear();
        let second = play_out(&mut player);

        assert_eq!(first, second);
        assert_eq!(player.into_sink().len(), 4);
    }

    #[test]
    fn test_crashed_recording_is_playable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crash.oscs");
        record_reference(&path);

        // Cut into the last record, as if the process died mid-write
        let mut bytes = std::fs::read(&path).unwrap();
        bytes.truncate(bytes.len() - 10);
        std::fs::write(&path, &bytes).unwrap();

        let mut player = Player::open(&path, Vec::<Packet>::new(), PlayerConfig::default()).unwrap();
        let mut log = Vec::new();
        let report = tick_logged(&mut player, &mut log);
        assert_eq!(report.diagnostics, [Diagnostic::Truncated]);

        log.extend(play_out(&mut player));
        let clocks: Vec<i64> = log.iter().map(|(clock, _)| *clock).collect();
        assert_eq!(clocks, [0, 1, 3]);
        assert_eq!(player.current_state(), PlayerState::Exhausted);
    }

    #[test]
    fn test_interleaved_frames_coalesce() {
        let mut recorder = Recorder::new(Vec::new(), RecorderConfig::default());
        for frame in 0..5u32 {
            recorder
                .record_event(frame, Message::new("/tick").with(frame as i32))
                .unwrap();
            recorder
                .record_event(frame, Message::new("/tock").with(frame as f32))
                .unwrap();
        }
        let bytes = recorder.finish().unwrap();

        let mut player = Player::new(Cursor::new(bytes), Vec::<Packet>::new(), PlayerConfig::default());
        player.rewind().unwrap();
        let log = play_out(&mut player);

        assert_eq!(log.len(), 5);
        for (i, (clock, packet)) in log.iter().enumerate() {
            assert_eq!(*clock, i as i64);
            assert!(packet.is_bundle());
            assert_eq!(packet.len(), 2);
        }
    }

    // ============================================================================
    // Script round trip
    // ============================================================================

    #[test]
    fn test_decompile_compile_recorded_score() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take3.oscs");
        record_reference(&path);

        let mut reader = ScoreReader::new(std::fs::File::open(&path).unwrap());
        let header = reader.read_header().unwrap();
        let events: Vec<_> = reader.by_ref().collect::<Result<_, _>>().unwrap();
        assert_eq!(reader.end(), Some(StreamEnd::Closed));

        let text = script::decompile(&header, &events).unwrap().to_toml().unwrap();
        let script_path = dir.path().join("take3.toml");
        std::fs::write(&script_path, text).unwrap();

        let parsed = ScoreScript::from_file(&script_path).unwrap();
        let bytes = script::compile_to_writer(&parsed, Vec::new()).unwrap();
        assert_eq!(bytes, std::fs::read(&path).unwrap());
    }

    // ============================================================================
    // Config
    // ============================================================================

    #[test]
    fn test_config_drives_recorder_and_player() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(config::CONFIG_FILE);
        std::fs::write(
            &config_path,
            "[recorder]\ngenerator = \"installation\"\n\n[player]\nlookahead = 2\n",
        )
        .unwrap();
        let config: Config = config::load_from(&config_path).unwrap();

        let score_path = dir.path().join("take4.oscs");
        let mut recorder = Recorder::create(&score_path, config.recorder.clone()).unwrap();
        for frame in [2, 4, 8] {
            recorder.record_event(frame, Message::new("/beat")).unwrap();
        }
        drop(recorder);

        let mut player = Player::open(&score_path, Vec::<Packet>::new(), config.player).unwrap();
        assert_eq!(player.header().unwrap().generator, "installation");
        player.tick();
        assert_eq!(player.queued(), 2);

        let log = play_out(&mut player);
        let clocks: Vec<i64> = log.iter().map(|(clock, _)| *clock).collect();
        assert_eq!(clocks, [2, 4, 8]);
    }
}
