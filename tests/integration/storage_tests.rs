//! SPIFFS partition and SD card mounts through the board.

use korvo_bsp::error::{BspError, MountError};
use korvo_bsp::ports::BackendKind;

use crate::mock_hw::{board_from, mock_board, mock_parts, CallLog, HwCall};

#[test]
fn spiffs_mount_queries_capacity_and_sets_state() {
    let (board, log) = mock_board();

    board.mount_embedded_partition().unwrap();
    assert!(board.is_embedded_partition_mounted());
    assert!(!board.is_removable_card_mounted());
    assert_eq!(
        log.calls(),
        vec![
            HwCall::Mount(BackendKind::EmbeddedPartition),
            HwCall::Capacity(BackendKind::EmbeddedPartition),
        ]
    );

    board.unmount_embedded_partition().unwrap();
    assert!(!board.is_embedded_partition_mounted());
}

#[test]
fn sdcard_unmount_without_mount_is_rejected() {
    let (board, log) = mock_board();
    assert_eq!(
        board.unmount_removable_card().unwrap_err(),
        BspError::Mount(MountError::NotMounted(BackendKind::RemovableCard))
    );
    assert!(log.calls().is_empty());
}

#[test]
fn sdcard_mount_failure_passes_code_through() {
    let log = CallLog::default();
    let mut parts = mock_parts(&log);
    parts.card.fail_mount = Some(0x107);
    let board = board_from(parts);

    assert_eq!(
        board.mount_removable_card().unwrap_err(),
        BspError::Mount(MountError::Mount {
            kind: BackendKind::RemovableCard,
            code: 0x107,
        })
    );
    assert!(!board.is_removable_card_mounted());
    assert_eq!(log.count(|c| matches!(c, HwCall::Capacity(_))), 0);
}

#[test]
fn capacity_failure_still_mounts() {
    let log = CallLog::default();
    let mut parts = mock_parts(&log);
    parts.flash.fail_capacity = Some(-1);
    let board = board_from(parts);

    assert_eq!(board.mount_embedded_partition(), Ok(()));
    assert!(board.is_embedded_partition_mounted());
}

#[test]
fn remount_after_unmount() {
    let (board, log) = mock_board();
    board.mount_removable_card().unwrap();
    board.unmount_removable_card().unwrap();
    board.mount_removable_card().unwrap();

    assert_eq!(log.count(|c| *c == HwCall::Mount(BackendKind::RemovableCard)), 2);
    assert!(board.is_removable_card_mounted());
}

#[test]
fn double_mount_is_rejected() {
    let (board, _log) = mock_board();
    board.mount_embedded_partition().unwrap();
    assert_eq!(
        board.mount_embedded_partition().unwrap_err(),
        BspError::Mount(MountError::AlreadyMounted(BackendKind::EmbeddedPartition))
    );
}
