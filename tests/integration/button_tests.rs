//! ADC ladder button creation.

use korvo_bsp::buttons::{ButtonId, BUTTON_COUNT, KORVO_BUTTONS};
use korvo_bsp::error::{ArgError, BspError, ConfigError, DeviceError};
use korvo_bsp::ports::RawHandle;

use crate::mock_hw::{board_from, mock_board, mock_parts, CallLog, HwCall, ADC_UNIT};

#[test]
fn creates_all_six_buttons_on_the_shared_adc_unit() {
    let (board, log) = mock_board();

    let buttons = board.create_button_array(BUTTON_COUNT).unwrap();
    assert_eq!(buttons.len(), BUTTON_COUNT);
    for id in ButtonId::ALL {
        assert!(buttons.get(id).is_some(), "{id:?} missing");
    }

    let creates: Vec<_> = log
        .calls()
        .into_iter()
        .filter(|c| matches!(c, HwCall::CreateButton { .. }))
        .collect();
    assert_eq!(creates.len(), BUTTON_COUNT);
    for (call, range) in creates.iter().zip(KORVO_BUTTONS.ranges()) {
        assert_eq!(
            *call,
            HwCall::CreateButton {
                index: range.id as u8,
                adc_unit: RawHandle::new(ADC_UNIT),
                min_mv: range.min_mv,
                max_mv: range.max_mv,
            }
        );
    }
}

#[test]
fn short_array_is_rejected_before_any_driver_call() {
    let (board, log) = mock_board();

    assert_eq!(
        board.create_button_array(3).unwrap_err(),
        BspError::Arg(ArgError::InsufficientCapacity { required: 6, given: 3 })
    );
    assert!(log.calls().is_empty());
    assert!(!board.adc().is_initialized());
}

#[test]
fn larger_array_is_fine() {
    let (board, _log) = mock_board();
    assert_eq!(board.create_button_array(16).unwrap().len(), BUTTON_COUNT);
}

#[test]
fn failure_unwinds_buttons_already_created() {
    let log = CallLog::default();
    let mut parts = mock_parts(&log);
    parts.buttons.fail_at = Some(2);
    let board = board_from(parts);

    assert_eq!(
        board.create_button_array(BUTTON_COUNT).unwrap_err(),
        BspError::Device(DeviceError::Button(2))
    );
    assert_eq!(log.count(|c| *c == HwCall::DeleteButton), 2);
    assert_eq!(board.into_parts().buttons.live, 0);
}

#[test]
fn adc_unit_is_installed_once_across_arrays() {
    let (board, log) = mock_board();

    let first = board.create_button_array(BUTTON_COUNT).unwrap();
    board.release_buttons(first);
    let _second = board.create_button_array(BUTTON_COUNT).unwrap();

    assert_eq!(log.count(|c| *c == HwCall::Install("adc")), 1);
    assert!(board.adc().is_initialized());
}

#[test]
fn adc_install_failure_is_a_config_error() {
    let log = CallLog::default();
    let mut parts = mock_parts(&log);
    parts.adc.fail_install = Some(0x103);
    let board = board_from(parts);

    assert_eq!(
        board.create_button_array(BUTTON_COUNT).unwrap_err(),
        BspError::Config(ConfigError::InstallFailed(0x103))
    );
    assert_eq!(log.count(|c| matches!(c, HwCall::CreateButton { .. })), 0);
}

#[test]
fn taken_button_is_deleted_on_its_own() {
    let (board, log) = mock_board();
    let mut buttons = board.create_button_array(BUTTON_COUNT).unwrap();

    let play = buttons.take(ButtonId::Play).unwrap();
    assert_eq!(buttons.len(), BUTTON_COUNT - 1);

    board.release_buttons(buttons);
    assert_eq!(log.count(|c| *c == HwCall::DeleteButton), BUTTON_COUNT - 1);

    board.delete_button(play).unwrap();
    assert_eq!(log.count(|c| *c == HwCall::DeleteButton), BUTTON_COUNT);
    assert_eq!(board.into_parts().buttons.live, 0);
}

#[test]
fn button_delete_failure_passes_the_driver_code_through() {
    let log = CallLog::default();
    let mut parts = mock_parts(&log);
    parts.buttons.fail_delete = Some(0x103);
    let board = board_from(parts);

    let mut buttons = board.create_button_array(BUTTON_COUNT).unwrap();
    let vol_up = buttons.take(ButtonId::VolUp).unwrap();
    assert_eq!(
        board.delete_button(vol_up).unwrap_err(),
        BspError::Device(DeviceError::ButtonDelete(0x103))
    );
}

#[test]
fn board_resolves_ladder_samples() {
    let (board, log) = mock_board();
    assert_eq!(board.resolve_button(2410), Some(ButtonId::Rec));
    assert_eq!(board.resolve_button(380), Some(ButtonId::VolUp));
    assert_eq!(board.resolve_button(1400), None);
    assert!(log.calls().is_empty());
}
