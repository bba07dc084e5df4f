use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use petab_plot::{OutputMode, PlotStyle, PlotTypeData, Plotter, PlotterInput, TableSource};

#[derive(Parser, Debug)]
#[command(name = "petab-plot")]
#[command(about = "Plot PEtab measurement and simulation tables", long_about = None)]
struct Args {
    /// Condition table (TSV, CSV, JSON or Parquet)
    #[arg(long)]
    conditions: PathBuf,

    /// Measurement table
    #[arg(long)]
    measurements: PathBuf,

    /// Simulation table
    #[arg(long)]
    simulation: Option<PathBuf>,

    /// Visualization table; when absent, subplots come from the lists below
    #[arg(long)]
    vis_spec: Option<PathBuf>,

    /// Dataset ids of one subplot, comma separated; repeat per subplot
    #[arg(long = "datasets")]
    datasets: Vec<String>,

    /// Simulation condition ids of one subplot; repeat per subplot
    #[arg(long = "conditions-ids")]
    conditions_ids: Vec<String>,

    /// Condition numbers (index into sorted condition ids) of one subplot
    #[arg(long = "conditions-nums")]
    conditions_nums: Vec<String>,

    /// Observable ids of one subplot; repeat per subplot
    #[arg(long = "observables")]
    observables: Vec<String>,

    /// Observable numbers (index into sorted observable ids) of one subplot
    #[arg(long = "observables-nums")]
    observables_nums: Vec<String>,

    /// Noise drawn as error bars when the visualization table gives none
    #[arg(long, value_enum, default_value = "MeanAndSD")]
    noise: Noise,

    /// Style settings as JSON
    #[arg(long)]
    style: Option<PathBuf>,

    /// Output image (.png or .svg); opens a window when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let style = match &args.style {
        Some(path) => PlotStyle::load(path)?,
        None => PlotStyle::default(),
    };
    let mut input = PlotterInput::new(
        TableSource::Path(args.conditions),
        TableSource::Path(args.measurements),
    );
    input.simulation = args.simulation.map(TableSource::Path);
    input.vis_spec = args.vis_spec.map(TableSource::Path);
    input.dataset_id_list = id_groups(&args.datasets);
    input.sim_cond_id_list = id_groups(&args.conditions_ids);
    input.sim_cond_num_list = num_groups(&args.conditions_nums).context("--conditions-nums")?;
    input.observable_id_list = id_groups(&args.observables);
    input.observable_num_list = num_groups(&args.observables_nums).context("--observables-nums")?;
    input.plotted_noise = args.noise.into();
    input.style = style;

    let plotter = Plotter::new(input)?;
    let mode = match args.output {
        Some(path) => OutputMode::File(path),
        None => OutputMode::Display,
    };
    let figure = plotter.generate_plot(&mode)?;

    if let OutputMode::File(path) = &mode {
        println!(
            "Wrote {} subplots to {}",
            figure.num_subplots(),
            path.display()
        );
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Noise {
    #[value(name = "MeanAndSD")]
    MeanAndSd,
    #[value(name = "MeanAndSEM")]
    MeanAndSem,
    #[value(name = "provided")]
    Provided,
}

impl From<Noise> for PlotTypeData {
    fn from(noise: Noise) -> Self {
        match noise {
            Noise::MeanAndSd => PlotTypeData::MeanAndSd,
            Noise::MeanAndSem => PlotTypeData::MeanAndSem,
            Noise::Provided => PlotTypeData::Provided,
        }
    }
}

/// Each occurrence of a flag is one subplot; its value is a comma list.
fn id_groups(values: &[String]) -> Option<Vec<Vec<String>>> {
    if values.is_empty() {
        return None;
    }
    Some(
        values
            .iter()
            .map(|group| {
                group
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .collect(),
    )
}

fn num_groups(values: &[String]) -> Result<Option<Vec<Vec<usize>>>> {
    let Some(groups) = id_groups(values) else {
        return Ok(None);
    };
    let parsed = groups
        .into_iter()
        .map(|group| {
            group
                .iter()
                .map(|n| n.parse::<usize>().with_context(|| format!("'{n}' is not a number")))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLES: [&str; 5] = ["petab-plot", "--conditions", "c.tsv", "--measurements", "m.tsv"];

    #[test]
    fn noise_defaults_to_mean_and_sd() {
        let args = Args::try_parse_from(TABLES).unwrap();
        assert_eq!(PlotTypeData::from(args.noise), PlotTypeData::MeanAndSd);
    }

    #[test]
    fn noise_accepts_aggregate_modes_only() {
        let args = Args::try_parse_from(TABLES.iter().copied().chain(["--noise", "MeanAndSEM"]))
            .unwrap();
        assert_eq!(args.noise, Noise::MeanAndSem);

        let err = Args::try_parse_from(TABLES.iter().copied().chain(["--noise", "replicate"]))
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn repeated_flags_make_one_group_each() {
        let groups = id_groups(&["d1, d2".to_string(), "d3".to_string()]).unwrap();
        assert_eq!(groups, vec![vec!["d1", "d2"], vec!["d3"]]);
        assert!(num_groups(&["1,x".to_string()]).is_err());
    }
}
