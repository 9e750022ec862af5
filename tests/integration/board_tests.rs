//! Whole-board behaviour: subsystem independence and control bus lifecycle.

use korvo_bsp::board::Board;
use korvo_bsp::buttons::BUTTON_COUNT;
use korvo_bsp::config::BoardConfig;
use korvo_bsp::error::{BspError, ConfigError};
use korvo_bsp::indicator::INDICATOR_COUNT;

use crate::mock_hw::{board_from, mock_board, mock_parts, CallLog, CodecStage, HwCall};

#[test]
fn failing_subsystems_do_not_block_the_others() {
    let log = CallLog::default();
    let mut parts = mock_parts(&log);
    parts.codecs.fail_at = Some(CodecStage::Codec);
    parts.buttons.fail_at = Some(0);
    parts.card.fail_mount = Some(-1);
    let board = board_from(parts);

    assert!(board.compose_speaker_endpoint().is_err());
    assert!(board.create_button_array(BUTTON_COUNT).is_err());
    assert!(board.mount_removable_card().is_err());

    assert!(board.create_indicator_array(INDICATOR_COUNT).is_ok());
    assert!(board.mount_embedded_partition().is_ok());
    assert!(board.control_bus().is_initialized());
}

#[test]
fn control_bus_init_is_idempotent() {
    let (board, log) = mock_board();
    board.init_control_bus().unwrap();
    board.init_control_bus().unwrap();
    let _spk = board.compose_speaker_endpoint().unwrap();

    assert_eq!(log.count(|c| *c == HwCall::Install("i2c")), 1);
    assert_eq!(log.count(|c| *c == HwCall::Configure("i2c")), 1);
}

#[test]
fn deinit_without_init_is_rejected() {
    let (board, log) = mock_board();
    assert_eq!(
        board.deinit_control_bus().unwrap_err(),
        BspError::Config(ConfigError::NotInitialized)
    );
    assert!(log.calls().is_empty());
}

#[test]
fn failed_deinit_leaves_bus_up() {
    let log = CallLog::default();
    let mut parts = mock_parts(&log);
    parts.control_bus.fail_delete = Some(0x103);
    let board = board_from(parts);

    board.init_control_bus().unwrap();
    assert_eq!(
        board.deinit_control_bus().unwrap_err(),
        BspError::Config(ConfigError::TeardownFailed(0x103))
    );
    assert!(board.control_bus().is_initialized());
}

#[test]
fn param_rejection_skips_install() {
    let log = CallLog::default();
    let mut parts = mock_parts(&log);
    parts.control_bus.fail_configure = Some(0x102);
    let board = board_from(parts);

    assert_eq!(
        board.init_control_bus().unwrap_err(),
        BspError::Config(ConfigError::ParamRejected(0x102))
    );
    assert_eq!(log.calls(), vec![HwCall::Configure("i2c")]);
}

#[test]
fn concurrent_composition_brings_streams_up_once() {
    let (board, log) = mock_board();
    std::thread::scope(|s| {
        for i in 0..8 {
            let board = &board;
            s.spawn(move || {
                let ep = if i % 2 == 0 {
                    board.compose_speaker_endpoint()
                } else {
                    board.compose_microphone_endpoint()
                };
                board.release_endpoint(ep.unwrap());
            });
        }
    });
    assert_eq!(log.count(|c| *c == HwCall::StreamInit), 1);
    assert_eq!(log.count(|c| *c == HwCall::Install("i2c")), 1);
    assert_eq!(board.into_parts().codecs.live(), 0);
}

#[test]
fn invalid_config_is_rejected_before_any_driver_call() {
    let log = CallLog::default();
    let cfg = BoardConfig {
        i2c_clk_speed_hz: 0,
        ..BoardConfig::default()
    };

    let err = Board::new(cfg, mock_parts(&log)).err();
    assert!(matches!(err, Some(BspError::Config(ConfigError::Invalid(_)))));
    assert!(log.calls().is_empty());
}
