use std::path::Path;

use tether_affinity::record_placement;
use tether_state::{NodeInfo, Operation};

use super::{load_settings, read_json};

/// Print `operation` with the status it gets once bound to `node`.
pub fn record(
    operation: &Path,
    node: &Path,
    run_id: Option<u64>,
    config: Option<&Path>,
) -> anyhow::Result<()> {
    let settings = load_settings(config)?;
    let mut op: Operation = read_json(operation)?;
    let node: NodeInfo = read_json(node)?;
    let run_id = run_id.unwrap_or(op.status.run_id + 1);

    match record_placement(&op, &node, run_id, &settings) {
        Some(status) => {
            op.status = status;
            println!("{}", serde_json::to_string_pretty(&op)?);
        }
        None => {
            eprintln!("run {run_id} already recorded for {}", op.table_key());
            println!("{}", serde_json::to_string_pretty(&op)?);
        }
    }
    Ok(())
}
