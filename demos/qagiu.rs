// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/// Integrate the proton energy of a power law above the pion threshold, the
/// same kind of semi-infinite integral that the pion-decay model reports.

use gammarad::pion_decay::THRESHOLD_TEV;
use gammarad::quad::IntegrationWorkspace;

fn main() {
    let mut ws = match IntegrationWorkspace::new(1024) {
        Ok(ws) => ws,
        Err(e) => {
            println!("Cannot set up integration: {}", e);
            return;
        },
    };
    let index = 2.5;

    match ws.qagiu(|e| e * e.powf(-index), THRESHOLD_TEV)
        .tolerance(0., 1e-6)
        .compute()
    {
        Ok(r) => {
            let exact = THRESHOLD_TEV.powf(2. - index) / (index - 2.);
            println!("Result: {}   Abs err: {}   Exact: {}", r.value, r.abserr, exact);
        },
        Err(e) => println!("Integration failed: {}", e),
    }
}
