//! Playground control commands and their wire representation.
//!
//! On the wire every command is one flat JSON object:
//! `{"CommandType", "PID", "ComponentID", "ConfigPath", "BinPath", "Num", "Host"}`
//! with all keys present. [`Command`] only carries the fields that mean
//! something for its type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CommandError;

/// Cluster component kinds a playground can scale out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Pd,
    Tikv,
    Pump,
    Tiflash,
    Tidb,
    Ticdc,
    Drainer,
}

impl ComponentKind {
    /// Order in which scale-out commands are emitted. PD has to come up
    /// before anything that registers with it.
    pub const SCALE_OUT_ORDER: [Self; 7] = [
        Self::Pd,
        Self::Tikv,
        Self::Pump,
        Self::Tiflash,
        Self::Tidb,
        Self::Ticdc,
        Self::Drainer,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pd => "pd",
            Self::Tikv => "tikv",
            Self::Pump => "pump",
            Self::Tiflash => "tiflash",
            Self::Tidb => "tidb",
            Self::Ticdc => "ticdc",
            Self::Drainer => "drainer",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::SCALE_OUT_ORDER
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CommandError::UnknownKind(s.to_owned()))
    }
}

/// Per-kind instance settings sent with every scale-out command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceConfig {
    #[serde(rename = "ConfigPath")]
    pub config_path: String,
    #[serde(rename = "BinPath")]
    pub bin_path: String,
    /// Desired instance count
    #[serde(rename = "Num")]
    pub num: u32,
    #[serde(rename = "Host")]
    pub host: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandType {
    #[serde(rename = "scale-in")]
    ScaleIn,
    #[serde(rename = "scale-out")]
    ScaleOut,
    #[serde(rename = "display")]
    Display,
    #[serde(rename = "handleRestart")]
    Restart,
    #[serde(rename = "handlePartition")]
    Partition,
}

impl CommandType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ScaleIn => "scale-in",
            Self::ScaleOut => "scale-out",
            Self::Display => "display",
            Self::Restart => "handleRestart",
            Self::Partition => "handlePartition",
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One instruction for the playground orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireCommand", try_from = "WireCommand")]
pub enum Command {
    ScaleOut {
        kind: ComponentKind,
        config: InstanceConfig,
    },
    ScaleIn {
        pid: u32,
    },
    Display,
    Restart {
        pid: u32,
    },
    Partition {
        pid: u32,
    },
}

impl Command {
    #[must_use]
    pub const fn command_type(&self) -> CommandType {
        match self {
            Self::ScaleOut { .. } => CommandType::ScaleOut,
            Self::ScaleIn { .. } => CommandType::ScaleIn,
            Self::Display => CommandType::Display,
            Self::Restart { .. } => CommandType::Restart,
            Self::Partition { .. } => CommandType::Partition,
        }
    }

    /// Target process id, for the commands that have one.
    #[must_use]
    pub const fn pid(&self) -> Option<u32> {
        match self {
            Self::ScaleIn { pid } | Self::Restart { pid } | Self::Partition { pid } => Some(*pid),
            Self::ScaleOut { .. } | Self::Display => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct WireCommand {
    #[serde(rename = "CommandType")]
    command_type: CommandType,
    #[serde(rename = "PID", default)]
    pid: u32,
    #[serde(rename = "ComponentID", default)]
    component_id: String,
    #[serde(flatten)]
    config: InstanceConfig,
}

impl From<Command> for WireCommand {
    fn from(command: Command) -> Self {
        let command_type = command.command_type();
        let pid = command.pid().unwrap_or_default();
        let (component_id, config) = match command {
            Command::ScaleOut { kind, config } => (kind.as_str().to_owned(), config),
            Command::ScaleIn { .. }
            | Command::Display
            | Command::Restart { .. }
            | Command::Partition { .. } => (String::new(), InstanceConfig::default()),
        };
        Self {
            command_type,
            pid,
            component_id,
            config,
        }
    }
}

impl TryFrom<WireCommand> for Command {
    type Error = CommandError;

    fn try_from(wire: WireCommand) -> Result<Self, Self::Error> {
        Ok(match wire.command_type {
            CommandType::ScaleOut => Self::ScaleOut {
                kind: wire.component_id.parse()?,
                config: wire.config,
            },
            CommandType::ScaleIn => Self::ScaleIn { pid: wire.pid },
            CommandType::Display => Self::Display,
            CommandType::Restart => Self::Restart { pid: wire.pid },
            CommandType::Partition => Self::Partition { pid: wire.pid },
        })
    }
}

/// Desired instance counts and settings per component kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootOptions {
    pub pd: InstanceConfig,
    pub tikv: InstanceConfig,
    pub pump: InstanceConfig,
    pub tiflash: InstanceConfig,
    pub tidb: InstanceConfig,
    pub ticdc: InstanceConfig,
    pub drainer: InstanceConfig,
}

impl BootOptions {
    #[must_use]
    pub const fn config(&self, kind: ComponentKind) -> &InstanceConfig {
        match kind {
            ComponentKind::Pd => &self.pd,
            ComponentKind::Tikv => &self.tikv,
            ComponentKind::Pump => &self.pump,
            ComponentKind::Tiflash => &self.tiflash,
            ComponentKind::Tidb => &self.tidb,
            ComponentKind::Ticdc => &self.ticdc,
            ComponentKind::Drainer => &self.drainer,
        }
    }

    pub fn config_mut(&mut self, kind: ComponentKind) -> &mut InstanceConfig {
        match kind {
            ComponentKind::Pd => &mut self.pd,
            ComponentKind::Tikv => &mut self.tikv,
            ComponentKind::Pump => &mut self.pump,
            ComponentKind::Tiflash => &mut self.tiflash,
            ComponentKind::Tidb => &mut self.tidb,
            ComponentKind::Ticdc => &mut self.ticdc,
            ComponentKind::Drainer => &mut self.drainer,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scale_in_wire_format() {
        let value = serde_json::to_value(Command::ScaleIn { pid: 111 }).unwrap();
        assert_eq!(
            value,
            json!({
                "CommandType": "scale-in",
                "PID": 111,
                "ComponentID": "",
                "ConfigPath": "",
                "BinPath": "",
                "Num": 0,
                "Host": ""
            })
        );
    }

    #[test]
    fn scale_out_wire_format() {
        let command = Command::ScaleOut {
            kind: ComponentKind::Tidb,
            config: InstanceConfig {
                config_path: "/etc/tidb.toml".to_owned(),
                bin_path: "/opt/tidb-server".to_owned(),
                num: 2,
                host: "127.0.0.2".to_owned(),
            },
        };
        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(
            value,
            json!({
                "CommandType": "scale-out",
                "PID": 0,
                "ComponentID": "tidb",
                "ConfigPath": "/etc/tidb.toml",
                "BinPath": "/opt/tidb-server",
                "Num": 2,
                "Host": "127.0.0.2"
            })
        );
    }

    #[test]
    fn restart_and_partition_use_handler_names() {
        let restart = serde_json::to_value(Command::Restart { pid: 7 }).unwrap();
        assert_eq!(restart["CommandType"], "handleRestart");
        assert_eq!(restart["PID"], 7);

        let partition = serde_json::to_value(Command::Partition { pid: 8 }).unwrap();
        assert_eq!(partition["CommandType"], "handlePartition");

        let display = serde_json::to_value(Command::Display).unwrap();
        assert_eq!(display["CommandType"], "display");
    }

    #[test]
    fn decode_orchestrator_view() {
        let command: Command = serde_json::from_value(json!({
            "CommandType": "scale-out",
            "ComponentID": "tikv",
            "Num": 1
        }))
        .unwrap();
        assert_eq!(
            command,
            Command::ScaleOut {
                kind: ComponentKind::Tikv,
                config: InstanceConfig {
                    num: 1,
                    ..InstanceConfig::default()
                },
            }
        );

        let command: Command =
            serde_json::from_value(json!({"CommandType": "display", "PID": 5})).unwrap();
        assert_eq!(command, Command::Display);
    }

    #[test]
    fn decode_rejects_unknown_kind() {
        let result: Result<Command, _> = serde_json::from_value(json!({
            "CommandType": "scale-out",
            "ComponentID": "grafana"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn kind_names_roundtrip() {
        for kind in ComponentKind::SCALE_OUT_ORDER {
            assert_eq!(kind.as_str().parse::<ComponentKind>().unwrap(), kind);
        }
        assert!(matches!(
            "tiup".parse::<ComponentKind>(),
            Err(CommandError::UnknownKind(_))
        ));
    }
}
