// Copyright 2017 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/// Time the three models on a fixed set of photon energies.
///
/// The inverse-Compton benchmarks come in cached and uncached flavors, since
/// resampling the electron distribution is a large part of the cost.

#[macro_use] extern crate bencher;

use bencher::Bencher;
use gammarad::units::ev;
use gammarad::{ExponentialCutoffPowerLaw, InverseCompton, PionDecay, PowerLaw, RadiativeModel, Synchrotron};
use uom::si::f64::Energy;

fn energies(log10_min: f64, log10_max: f64, n: usize) -> Vec<Energy> {
    gammarad::quad::logspace(log10_min, log10_max, n).into_iter().map(ev).collect()
}

fn electrons() -> ExponentialCutoffPowerLaw {
    ExponentialCutoffPowerLaw::new(1e36, gammarad::units::tev(1.), 2.5, gammarad::units::tev(100.), 1.).unwrap()
}


fn synchrotron_optical_to_xray(b: &mut Bencher) {
    let sy = Synchrotron::new(electrons());
    let e = energies(0., 5., 50);

    b.iter(|| {
        sy.flux(&e).unwrap();
    });
}

fn inverse_compton_cmb(b: &mut Bencher) {
    let ic = InverseCompton::new(electrons());
    let e = energies(9., 14., 50);

    b.iter(|| {
        ic.flux(&e).unwrap();
    });
}

fn inverse_compton_three_seeds_prepared(b: &mut Bencher) {
    let mut ic = InverseCompton::new(electrons()).seed_string("CMB-FIR-NIR").unwrap();
    ic.prepare();
    let e = energies(9., 14., 50);

    b.iter(|| {
        ic.flux(&e).unwrap();
    });
}

fn pion_decay_straddling(b: &mut Bencher) {
    let pd = PionDecay::new(PowerLaw::new(1e33, gammarad::units::tev(1.), 2.5).unwrap());
    let e = energies(9., 13., 20);

    b.iter(|| {
        pd.flux(&e).unwrap();
    });
}


benchmark_group!(leptonic, synchrotron_optical_to_xray, inverse_compton_cmb,
                 inverse_compton_three_seeds_prepared);
benchmark_group!(hadronic, pion_decay_straddling);
benchmark_main!(leptonic, hadronic);
