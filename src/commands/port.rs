use wtenv::feature::{PortAssignment, safe_feature_name};
use wtenv::styling::println;

/// Print the app port (and with `container`, the db port) for a feature.
///
/// Touches neither git, docker nor the filesystem.
pub(crate) fn handle_port(feature: &str, port: Option<u32>, container: bool) -> anyhow::Result<()> {
    let safe_name = safe_feature_name(feature)?;
    let ports = PortAssignment::new(&safe_name, port);
    println!("{}", ports.app_port);
    if container {
        println!("{}", ports.db_port);
    }
    Ok(())
}
