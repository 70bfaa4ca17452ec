use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    ListDevices,
    GetDeviceData,
    GetInstantaneousDemand,
    GetDemandValues,
    GetSummationValues,
    GetFastPollStatus,
    SetFastPoll,
    GetHistoryData,
}

impl Command {
    pub const ALL: [Command; 8] = [
        Command::ListDevices,
        Command::GetDeviceData,
        Command::GetInstantaneousDemand,
        Command::GetDemandValues,
        Command::GetSummationValues,
        Command::GetFastPollStatus,
        Command::SetFastPoll,
        Command::GetHistoryData,
    ];

    pub fn wire_name(&self) -> &'static str {
        match self {
            Command::ListDevices => "LIST_DEVICES",
            Command::GetDeviceData => "GET_DEVICE_DATA",
            Command::GetInstantaneousDemand => "GET_INSTANTANEOUS_DEMAND",
            Command::GetDemandValues => "GET_DEMAND_VALUES",
            Command::GetSummationValues => "GET_SUMMATION_VALUES",
            Command::GetFastPollStatus => "GET_FAST_POLL_STATUS",
            Command::SetFastPoll => "SET_FAST_POLL",
            Command::GetHistoryData => "GET_HISTORY_DATA",
        }
    }

    pub fn accepts(&self, param: Param) -> bool {
        match self {
            Command::GetDemandValues | Command::GetSummationValues => param == Param::Interval,
            Command::SetFastPoll => matches!(param, Param::Frequency | Param::Duration),
            Command::GetHistoryData => matches!(param, Param::StartTime | Param::EndTime | Param::Frequency),
            Command::ListDevices | Command::GetDeviceData | Command::GetInstantaneousDemand | Command::GetFastPollStatus => false,
        }
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

impl FromStr for Command {
    type Err = UnknownCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|command| command.wire_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCommandError { name: s.to_string() })
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("unknown command '{name}'")]
pub struct UnknownCommandError {
    pub name: String,
}

/// Request parameters, in the order they are written to the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Param {
    StartTime,
    EndTime,
    Interval,
    Frequency,
    Duration,
}

impl Param {
    pub const ALL: [Param; 5] = [Param::StartTime, Param::EndTime, Param::Interval, Param::Frequency, Param::Duration];

    pub fn element_name(&self) -> &'static str {
        match self {
            Param::StartTime => "StartTime",
            Param::EndTime => "EndTime",
            Param::Interval => "Interval",
            Param::Frequency => "Frequency",
            Param::Duration => "Duration",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue {
    Instant(DateTime<Utc>),
    Integer(u32),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandParams {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub interval: Option<u32>,
    pub frequency: Option<u32>,
    pub duration: Option<u32>,
}

impl CommandParams {
    pub fn get(&self, param: Param) -> Option<ParamValue> {
        match param {
            Param::StartTime => self.start.map(ParamValue::Instant),
            Param::EndTime => self.end.map(ParamValue::Instant),
            Param::Interval => self.interval.map(ParamValue::Integer),
            Param::Frequency => self.frequency.map(ParamValue::Integer),
            Param::Duration => self.duration.map(ParamValue::Integer),
        }
    }

    /// The parameters that are set and accepted by `command`, in wire order.
    pub fn accepted_by(&self, command: Command) -> impl Iterator<Item = (Param, ParamValue)> + '_ {
        Param::ALL
            .into_iter()
            .filter(move |param| command.accepts(*param))
            .filter_map(move |param| self.get(param).map(|value| (param, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("LIST_DEVICES", Command::ListDevices)]
    #[case("get_device_data", Command::GetDeviceData)]
    #[case(" GET_HISTORY_DATA ", Command::GetHistoryData)]
    #[case("Set_Fast_Poll", Command::SetFastPoll)]
    fn parses_command_names(#[case] name: &str, #[case] expected: Command) {
        assert_eq!(name.parse::<Command>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_command_names() {
        let result = "REBOOT".parse::<Command>();

        assert_eq!(result, Err(UnknownCommandError { name: "REBOOT".to_string() }));
    }

    #[test]
    fn wire_names_round_trip_for_all_commands() {
        for command in Command::ALL {
            assert_eq!(command.wire_name().parse::<Command>(), Ok(command));
        }
    }

    #[test]
    fn accepted_by_drops_parameters_the_command_does_not_take() {
        let params = CommandParams {
            interval: Some(60),
            frequency: Some(5),
            duration: Some(10),
            ..CommandParams::default()
        };

        let accepted: Vec<Param> = params.accepted_by(Command::SetFastPoll).map(|(param, _)| param).collect();

        assert_eq!(accepted, vec![Param::Frequency, Param::Duration]);
        assert_eq!(params.accepted_by(Command::GetDeviceData).count(), 0);
    }
}
