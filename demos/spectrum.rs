// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/// Print the spectrum of one radiative process for a cutoff power-law
/// particle population.
///
/// Model options can be overridden with repeated `--set KEY=VALUE`
/// arguments, e.g. `--set seeds=CMB-FIR --set grid.points_per_decade=50`.

#[macro_use] extern crate slog;

use clap::{crate_name, crate_version, value_parser, Arg, ArgAction, Command};
use gammarad::config::split_assignment;
use gammarad::units::{ev, extract_energies, tev, to_ev};
use gammarad::{EnergyAxis, ExponentialCutoffPowerLaw, InverseCompton, PionDecay, RadiativeModel, Spectrum,
               SpectrumKind, Synchrotron};
use slog::Logger;
use uom::si::f64::Energy;

fn build_model(name: &str, pop: ExponentialCutoffPowerLaw, settings: &[String],
               log: &Logger) -> gammarad::Result<Box<dyn RadiativeModel>> {
    macro_rules! configure {
        ($model:expr) => {{
            let mut m = $model.logger(log.clone());

            for s in settings {
                let (key, value) = split_assignment(s)?;
                m.set(key, value)?;
            }

            Box::new(m) as Box<dyn RadiativeModel>
        }}
    }

    Ok(match name {
        "synchrotron" => configure!(Synchrotron::new(pop)),
        "ic" => configure!(InverseCompton::new(pop)),
        "pion" => configure!(PionDecay::new(pop)),
        _ => unreachable!(),
    })
}

fn run(log: Logger) -> gammarad::Result<()> {
    let matches = Command::new(crate_name!())
        .version(crate_version!())
        .about("Compute a photon spectrum for a cutoff power-law particle distribution")
        .arg(Arg::new("MODEL")
             .help("Which radiative process to compute")
             .required(true)
             .value_parser(["synchrotron", "ic", "pion"])
             .index(1))
        .arg(Arg::new("index")
             .long("index")
             .help("The power-law index of the particle distribution")
             .value_parser(value_parser!(f64))
             .default_value("2.5"))
        .arg(Arg::new("cutoff")
             .long("cutoff")
             .help("The cutoff energy of the particle distribution, in TeV")
             .value_parser(value_parser!(f64))
             .default_value("100"))
        .arg(Arg::new("emin")
             .long("emin")
             .help("The smallest photon energy, in eV")
             .value_parser(value_parser!(f64))
             .default_value("1e-3"))
        .arg(Arg::new("emax")
             .long("emax")
             .help("The largest photon energy, in eV")
             .value_parser(value_parser!(f64))
             .default_value("1e14"))
        .arg(Arg::new("n")
             .short('n')
             .help("The number of photon energies")
             .value_parser(value_parser!(usize))
             .default_value("50"))
        .arg(Arg::new("set")
             .long("set")
             .help("Override a model option")
             .value_name("KEY=VALUE")
             .action(ArgAction::Append))
        .get_matches();

    let get = |name: &str| matches.get_one::<f64>(name).copied().unwrap_or_default();
    let model_name = matches.get_one::<String>("MODEL").map(|s| s.as_str()).unwrap_or("synchrotron");
    let n = matches.get_one::<usize>("n").copied().unwrap_or(50);
    let settings: Vec<String> = matches.get_many::<String>("set")
        .map(|vals| vals.cloned().collect())
        .unwrap_or_default();

    let amplitude = if model_name == "pion" { 1e33 } else { 1e36 };
    let pop = ExponentialCutoffPowerLaw::new(amplitude, tev(1.), get("index"), tev(get("cutoff")), 1.)?;
    let model = build_model(model_name, pop, &settings, &log)?;

    let energies: Vec<Energy> = gammarad::quad::logspace(get("emin").log10(), get("emax").log10(), n)
        .into_iter()
        .map(ev)
        .collect();
    let energies = extract_energies(&EnergyAxis::from(energies))?;

    info!(log, "computing spectrum"; "model" => model_name, "n_energies" => n);
    let flux = Spectrum::new(SpectrumKind::Flux, energies.clone(), model.compute_flux(&energies)?)?;
    let sed = flux.clone().to_sed();

    println!("energy_eV\tflux_per_s_eV\tsed_erg_per_s");

    for ((e, f), s) in flux.iter().zip(sed.values()) {
        println!("{:.8e}\t{:.8e}\t{:.8e}", to_ev(e), f, s);
    }

    Ok(())
}

fn main() {
    let log = gammarad_test_support::default_log();

    if let Err(e) = run(log.clone()) {
        error!(log, "{}", e);
        drop(log);
        std::process::exit(1);
    }
}
