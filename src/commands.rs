//! Outbound command frames for the timer-scale family.

use crate::protocol::{create_command, COMMAND_FRAME_LEN};
use crate::scales::ScaleCommand;

pub const CMD_TARE: u8 = 0x01;
pub const CMD_START_TIMER: u8 = 0x04;
pub const CMD_STOP_TIMER: u8 = 0x05;
pub const CMD_RESET_TIMER: u8 = 0x06;

pub type CommandBytes = [u8; COMMAND_FRAME_LEN];

pub fn build_tare_command() -> CommandBytes {
    create_command(CMD_TARE, 0x00, 0x00)
}

pub fn build_start_command() -> CommandBytes {
    create_command(CMD_START_TIMER, 0x00, 0x00)
}

pub fn build_stop_command() -> CommandBytes {
    create_command(CMD_STOP_TIMER, 0x00, 0x00)
}

pub fn build_reset_command() -> CommandBytes {
    create_command(CMD_RESET_TIMER, 0x00, 0x00)
}

pub fn encode(command: ScaleCommand) -> CommandBytes {
    match command {
        ScaleCommand::Tare => build_tare_command(),
        ScaleCommand::StartTimer => build_start_command(),
        ScaleCommand::StopTimer => build_stop_command(),
        ScaleCommand::ResetTimer => build_reset_command(),
    }
}
