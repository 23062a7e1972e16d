/// Environment variable holding the profile root.
pub const ENV_NAME_HOME: &str = "TIUP_HOME";

/// Environment variable holding the working directory of the current instance.
///
/// Injected into every launched child; its presence in our own environment
/// means we were started by another `tiup run`.
pub const ENV_NAME_INSTANCE_DATA_DIR: &str = "TIUP_INSTANCE_DATA_DIR";

/// Profile directory name under the user's home when `TIUP_HOME` is unset.
pub const DEFAULT_TIUP_HOME: &str = ".tiup";

pub const DATA_PARENT_DIR: &str = "data";
pub const COMPONENT_PARENT_DIR: &str = "components";
pub const MANIFEST_PARENT_DIR: &str = "manifest";

/// Name of the process metadata file written inside each instance directory.
pub const META_FILENAME: &str = "tiup_process_meta";

/// Name of the optional YAML config file inside the profile root.
pub const CONFIG_FILENAME: &str = "config.yaml";

pub const MANIFEST_FILENAME: &str = "tiup-manifest.index";

pub const DEFAULT_MIRROR: &str = "https://tiup-mirrors.pingcap.com";

/// File name of the cached version list for `component`.
#[must_use]
pub fn component_manifest_filename(component: &str) -> String {
    format!("tiup-component-{component}.index")
}
