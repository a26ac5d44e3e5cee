//! Contract input loading

use crate::error::CliError;
use datacontract_core::{Contract, ContractLoader};
use std::io::Read;
use tracing::debug;

const STDIN: &str = "-";

/// Load a contract from a path, URL or stdin
pub fn load_contract(loader: &ContractLoader, location: &str) -> Result<Contract, CliError> {
    let result = if location == STDIN {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::Stdin(e.to_string()))?;
        loader.load_str(&content)
    } else {
        loader.load(location)
    };
    result.map_err(|error| CliError::Load {
        location: location.to_string(),
        error,
    })
}

/// Load both versions of a contract in parallel
pub fn load_pair(
    loader: &ContractLoader,
    old: &str,
    new: &str,
) -> Result<(Contract, Contract), CliError> {
    if old == STDIN && new == STDIN {
        return Err(CliError::InvalidArgument(
            "only one contract can be read from stdin".to_string(),
        ));
    }

    debug!("Loading {} and {}", old, new);
    let (old_contract, new_contract) = rayon::join(
        || load_contract(loader, old),
        || load_contract(loader, new),
    );
    Ok((old_contract?, new_contract?))
}
