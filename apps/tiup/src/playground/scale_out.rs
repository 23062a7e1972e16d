use clap::Args;
use tiup_playground_client::{BootOptions, Command, ComponentKind, build_scale_out};

/// Instance counts and per-kind overrides for `playground scale-out`.
#[derive(Args, Default)]
pub struct ScaleOutArgs {
    /// TiDB instance number
    #[arg(long = "db", default_value_t = 0)]
    db: u32,
    /// TiKV instance number
    #[arg(long = "kv", default_value_t = 0)]
    kv: u32,
    /// PD instance number
    #[arg(long = "pd", default_value_t = 0)]
    pd: u32,
    /// TiFlash instance number
    #[arg(long = "tiflash", default_value_t = 0)]
    tiflash: u32,
    /// TiCDC instance number
    #[arg(long = "ticdc", default_value_t = 0)]
    ticdc: u32,
    /// Pump instance number
    #[arg(long = "pump", default_value_t = 0)]
    pump: u32,
    /// Drainer instance number
    #[arg(long = "drainer", default_value_t = 0)]
    drainer: u32,

    /// TiDB instance host
    #[arg(long = "db.host", value_name = "HOST")]
    db_host: Option<String>,
    /// TiDB instance configuration file
    #[arg(long = "db.config", value_name = "PATH")]
    db_config: Option<String>,
    /// TiDB instance binary path
    #[arg(long = "db.binpath", value_name = "PATH")]
    db_binpath: Option<String>,

    /// TiKV instance host
    #[arg(long = "kv.host", value_name = "HOST")]
    kv_host: Option<String>,
    /// TiKV instance configuration file
    #[arg(long = "kv.config", value_name = "PATH")]
    kv_config: Option<String>,
    /// TiKV instance binary path
    #[arg(long = "kv.binpath", value_name = "PATH")]
    kv_binpath: Option<String>,

    /// PD instance host
    #[arg(long = "pd.host", value_name = "HOST")]
    pd_host: Option<String>,
    /// PD instance configuration file
    #[arg(long = "pd.config", value_name = "PATH")]
    pd_config: Option<String>,
    /// PD instance binary path
    #[arg(long = "pd.binpath", value_name = "PATH")]
    pd_binpath: Option<String>,

    /// TiFlash instance host
    #[arg(long = "tiflash.host", value_name = "HOST")]
    tiflash_host: Option<String>,
    /// TiFlash instance configuration file
    #[arg(long = "tiflash.config", value_name = "PATH")]
    tiflash_config: Option<String>,
    /// TiFlash instance binary path
    #[arg(long = "tiflash.binpath", value_name = "PATH")]
    tiflash_binpath: Option<String>,

    /// TiCDC instance host
    #[arg(long = "ticdc.host", value_name = "HOST")]
    ticdc_host: Option<String>,
    /// TiCDC instance configuration file
    #[arg(long = "ticdc.config", value_name = "PATH")]
    ticdc_config: Option<String>,
    /// TiCDC instance binary path
    #[arg(long = "ticdc.binpath", value_name = "PATH")]
    ticdc_binpath: Option<String>,

    /// Pump instance host
    #[arg(long = "pump.host", value_name = "HOST")]
    pump_host: Option<String>,
    /// Pump instance configuration file
    #[arg(long = "pump.config", value_name = "PATH")]
    pump_config: Option<String>,
    /// Pump instance binary path
    #[arg(long = "pump.binpath", value_name = "PATH")]
    pump_binpath: Option<String>,

    /// Drainer instance host
    #[arg(long = "drainer.host", value_name = "HOST")]
    drainer_host: Option<String>,
    /// Drainer instance configuration file
    #[arg(long = "drainer.config", value_name = "PATH")]
    drainer_config: Option<String>,
    /// Drainer instance binary path
    #[arg(long = "drainer.binpath", value_name = "PATH")]
    drainer_binpath: Option<String>,
}

impl ScaleOutArgs {
    fn boot_options(&self) -> BootOptions {
        let mut opts = BootOptions::default();
        let kinds = [
            (
                ComponentKind::Tidb,
                self.db,
                &self.db_host,
                &self.db_config,
                &self.db_binpath,
            ),
            (
                ComponentKind::Tikv,
                self.kv,
                &self.kv_host,
                &self.kv_config,
                &self.kv_binpath,
            ),
            (
                ComponentKind::Pd,
                self.pd,
                &self.pd_host,
                &self.pd_config,
                &self.pd_binpath,
            ),
            (
                ComponentKind::Tiflash,
                self.tiflash,
                &self.tiflash_host,
                &self.tiflash_config,
                &self.tiflash_binpath,
            ),
            (
                ComponentKind::Ticdc,
                self.ticdc,
                &self.ticdc_host,
                &self.ticdc_config,
                &self.ticdc_binpath,
            ),
            (
                ComponentKind::Pump,
                self.pump,
                &self.pump_host,
                &self.pump_config,
                &self.pump_binpath,
            ),
            (
                ComponentKind::Drainer,
                self.drainer,
                &self.drainer_host,
                &self.drainer_config,
                &self.drainer_binpath,
            ),
        ];
        for (kind, num, host, config_path, bin_path) in kinds {
            let config = opts.config_mut(kind);
            config.num = num;
            config.host = host.clone().unwrap_or_default();
            config.config_path = config_path.clone().unwrap_or_default();
            config.bin_path = bin_path.clone().unwrap_or_default();
        }
        opts
    }

    #[must_use]
    pub fn build(&self) -> Vec<Command> {
        build_scale_out(&self.boot_options())
    }
}
