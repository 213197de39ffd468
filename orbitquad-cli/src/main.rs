use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use orbitquad_core::{
    by_name, monomial_count, monomial_exponents, BarycentricOrbit, DegreeCertificate, Expr,
    OrbitDescriptor, Scalar, Surd, Tolerance, VerifyOptions, SCHEME_NAMES,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Fsd { dim, group, exact } => {
            if exact {
                run_fsd::<Surd>(dim, &group)
            } else {
                run_fsd::<f64>(dim, &group)
            }
        }
        Command::Pm {
            dim,
            magnitude,
            exact,
        } => {
            if exact {
                run_pm::<Surd>(dim, &magnitude)
            } else {
                run_pm::<f64>(dim, &magnitude)
            }
        }
        Command::PmArray { values, exact } => {
            if exact {
                run_pm_array::<Surd>(&values)
            } else {
                run_pm_array::<f64>(&values)
            }
        }
        Command::PmArray0 {
            dim,
            values,
            indices,
            exact,
        } => {
            if exact {
                run_pm_array0::<Surd>(dim, &values, indices)
            } else {
                run_pm_array0::<f64>(dim, &values, indices)
            }
        }
        Command::Bary {
            class,
            params,
            exact,
        } => {
            if exact {
                run_bary::<Surd>(&class, &params)
            } else {
                run_bary::<f64>(&class, &params)
            }
        }
        Command::Monomials { dim, degree } => {
            run_monomials(dim, degree);
            Ok(())
        }
        Command::List => {
            run_list();
            Ok(())
        }
        Command::Verify {
            scheme,
            dim,
            bound,
            tol,
            probe,
            exact,
        } => {
            let options = VerifyOptions::default()
                .with_degree_bound(bound)
                .with_tolerance(Tolerance::uniform(tol))
                .with_probe(probe);
            if exact {
                run_verify::<Surd>(&scheme, dim, &options)
            } else {
                run_verify::<f64>(&scheme, dim, &options)
            }
        }
    }
}

/// `RUST_LOG` directives when they parse, `warn` otherwise.
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

#[derive(Parser, Debug)]
#[command(
    name = "orbitquad",
    about = "Symmetry-orbit expansion and exactness checks for quadrature schemes"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Expand a full-symmetric orbit: all placements and signs of the groups
    Fsd {
        /// Dimension of the points
        #[arg(long, default_value_t = 3)]
        dim: usize,

        /// Magnitude group as EXPR:MULTIPLICITY (repeatable), e.g. sqrt(1/2):2
        #[arg(long, required = true)]
        group: Vec<String>,

        /// Use exact arithmetic
        #[arg(long, action = ArgAction::SetTrue)]
        exact: bool,
    },

    /// Expand (±m, ..., ±m)
    Pm {
        #[arg(long, default_value_t = 3)]
        dim: usize,

        #[arg(long)]
        magnitude: String,

        #[arg(long, action = ArgAction::SetTrue)]
        exact: bool,
    },

    /// Expand every sign combination of a magnitude vector
    PmArray {
        /// Comma-separated magnitudes, one per coordinate
        #[arg(long, required = true, num_args = 1.., value_delimiter = ',')]
        values: Vec<String>,

        #[arg(long, action = ArgAction::SetTrue)]
        exact: bool,
    },

    /// Expand magnitudes placed at given coordinates, zeros elsewhere
    PmArray0 {
        #[arg(long, default_value_t = 3)]
        dim: usize,

        #[arg(long, required = true, num_args = 1.., value_delimiter = ',')]
        values: Vec<String>,

        /// Zero-based coordinate of each magnitude
        #[arg(long, required = true, num_args = 1.., value_delimiter = ',')]
        indices: Vec<usize>,

        #[arg(long, action = ArgAction::SetTrue)]
        exact: bool,
    },

    /// Expand a barycentric symmetry class (s3, s21, s111, s4, s31, s22, s211, s1111)
    Bary {
        #[arg(long)]
        class: String,

        /// Free parameters of the class
        #[arg(long, num_args = 0.., value_delimiter = ',')]
        params: Vec<String>,

        #[arg(long, action = ArgAction::SetTrue)]
        exact: bool,
    },

    /// List monomial exponents of one total degree
    Monomials {
        #[arg(long, default_value_t = 2)]
        dim: usize,

        #[arg(long, default_value_t = 2)]
        degree: usize,
    },

    /// List the catalog schemes
    List,

    /// Certify the degree of a catalog scheme
    Verify {
        /// Catalog name (see `list`)
        #[arg(long)]
        scheme: String,

        /// Dimension for the cube and E_n^r2 rules
        #[arg(long)]
        dim: Option<usize>,

        /// Highest degree checked
        #[arg(long, default_value_t = 30)]
        bound: usize,

        /// Absolute and relative tolerance (floating mode)
        #[arg(long, default_value_t = 1e-13)]
        tol: f64,

        /// Also check the degree after the first failure
        #[arg(long, action = ArgAction::SetTrue)]
        probe: bool,

        #[arg(long, action = ArgAction::SetTrue)]
        exact: bool,
    },
}

fn parse_scalar<T: Scalar>(text: &str) -> Result<T> {
    Expr::parse(text)
        .and_then(|e| e.eval())
        .with_context(|| format!("invalid value '{}'", text))
}

fn parse_scalars<T: Scalar>(texts: &[String]) -> Result<Vec<T>> {
    texts.iter().map(|t| parse_scalar(t)).collect()
}

fn format_row<T: Scalar>(row: &[T]) -> String {
    let parts: Vec<String> = row.iter().map(|x| x.to_string()).collect();
    format!("({})", parts.join(", "))
}

fn print_orbit<T: Scalar>(rows: &[Vec<T>], expected: usize) {
    for (i, row) in rows.iter().enumerate() {
        println!("  {:>3}) {}", i + 1, format_row(row));
    }
    println!(
        "\n[Regression] Expected orbit size={}  => observed={}{}",
        expected,
        rows.len(),
        if rows.len() == expected {
            "  (OK)"
        } else {
            "  (MISMATCH)"
        }
    );
}

fn expand_descriptor<T: Scalar>(descriptor: OrbitDescriptor<T>, dim: usize) -> Result<()> {
    let expected = descriptor.orbit_size(dim)?;
    let rows = descriptor.expand(dim, T::MODE)?;
    println!("Orbit in dimension {} ({} arithmetic):", dim, T::MODE);
    print_orbit(&rows, expected);
    Ok(())
}

fn run_fsd<T: Scalar>(dim: usize, groups: &[String]) -> Result<()> {
    let mut parsed = Vec::new();
    for g in groups {
        let Some((value, mult)) = g.rsplit_once(':') else {
            bail!("group '{}' is not of the form EXPR:MULTIPLICITY", g);
        };
        let mult: usize = mult
            .trim()
            .parse()
            .with_context(|| format!("invalid multiplicity in '{}'", g))?;
        parsed.push((parse_scalar::<T>(value)?, mult));
    }
    expand_descriptor(OrbitDescriptor::fsd(parsed)?, dim)
}

fn run_pm<T: Scalar>(dim: usize, magnitude: &str) -> Result<()> {
    expand_descriptor(OrbitDescriptor::pm(parse_scalar::<T>(magnitude)?), dim)
}

fn run_pm_array<T: Scalar>(values: &[String]) -> Result<()> {
    let magnitudes = parse_scalars::<T>(values)?;
    let dim = magnitudes.len();
    expand_descriptor(OrbitDescriptor::pm_array(magnitudes)?, dim)
}

fn run_pm_array0<T: Scalar>(dim: usize, values: &[String], indices: Vec<usize>) -> Result<()> {
    let magnitudes = parse_scalars::<T>(values)?;
    expand_descriptor(OrbitDescriptor::pm_array0(magnitudes, indices)?, dim)
}

fn barycentric_orbit<T: Scalar>(class: &str, params: Vec<T>) -> Result<BarycentricOrbit<T>> {
    let lower = class.to_ascii_lowercase();
    let orbit = match (lower.as_str(), params.as_slice()) {
        ("s3", []) => BarycentricOrbit::S3,
        ("s21", [a]) => BarycentricOrbit::S21 { a: a.clone() },
        ("s111", [a, b]) => BarycentricOrbit::S111 {
            a: a.clone(),
            b: b.clone(),
        },
        ("s4", []) => BarycentricOrbit::S4,
        ("s31", [a]) => BarycentricOrbit::S31 { a: a.clone() },
        ("s22", [a]) => BarycentricOrbit::S22 { a: a.clone() },
        ("s211", [a, b]) => BarycentricOrbit::S211 {
            a: a.clone(),
            b: b.clone(),
        },
        ("s1111", [a, b, c]) => BarycentricOrbit::S1111 {
            a: a.clone(),
            b: b.clone(),
            c: c.clone(),
        },
        _ => bail!(
            "unknown class '{}' or wrong number of parameters ({})",
            class,
            params.len()
        ),
    };
    Ok(orbit)
}

fn run_bary<T: Scalar>(class: &str, params: &[String]) -> Result<()> {
    let orbit = barycentric_orbit(class, parse_scalars::<T>(params)?)?;
    let rows = orbit.expand(T::MODE)?;
    println!(
        "Barycentric class {} ({} arithmetic):",
        orbit.tag(),
        T::MODE
    );
    print_orbit(&rows, orbit.orbit_size());
    Ok(())
}

fn run_monomials(dim: usize, degree: usize) {
    let all = monomial_exponents(dim, degree);
    println!("Monomials of degree {} in {} variables (count={})", degree, dim, all.len());
    for (i, e) in all.iter().enumerate() {
        println!("  {:>3}) {:?}", i + 1, e);
    }
    if let Some(expected) = monomial_count(dim, degree) {
        println!(
            "\n[Regression] Expected count={}  => observed={}{}",
            expected,
            all.len(),
            if all.len() == expected {
                "  (OK)"
            } else {
                "  (MISMATCH)"
            }
        );
    }
}

fn run_list() {
    println!("Catalog schemes:");
    for name in SCHEME_NAMES {
        match by_name::<f64>(name, None) {
            Ok(s) => println!(
                "  {:<18} {:<12} degree {:>2}  points {:>3}",
                name,
                s.domain.to_string(),
                s.degree,
                s.table.len()
            ),
            Err(e) => println!("  {:<18} ({})", name, e),
        }
    }
}

fn run_verify<T: Scalar>(name: &str, dim: Option<usize>, options: &VerifyOptions) -> Result<()> {
    let scheme =
        by_name::<T>(name, dim).with_context(|| format!("cannot build scheme '{}'", name))?;
    println!(
        "{} on {}: {} points, {} arithmetic, degree bound {}",
        scheme.name,
        scheme.domain,
        scheme.table.len(),
        T::MODE,
        options.degree_bound
    );
    let verification = scheme.verify(options)?;
    if let Some(m) = &verification.mismatch {
        println!(
            "First failing monomial {:?}: quadrature={}  exact={}",
            m.exponents, m.quadrature, m.exact
        );
    }
    if let Some(a) = verification.anomaly {
        println!(
            "Note: degree {} failed but degree {} passed",
            a.failed_degree, a.passed_degree
        );
    }
    println!(
        "Checked {} monomials => {}",
        verification.monomials_checked, verification.certificate
    );
    println!(
        "\n[Regression] Claimed degree={}  => observed={}{}",
        scheme.degree,
        verification.certificate,
        if verification.certificate == DegreeCertificate::Exact(scheme.degree) {
            "  (OK)"
        } else {
            "  (MISMATCH)"
        }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_log_filter_defaults_to_warn() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(
            log_filter(Some("debug".into())).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(
            log_filter(Some("orbitquad_core=trace".into())).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn test_cli_parses_fsd_groups() {
        let cli = Cli::parse_from([
            "orbitquad",
            "fsd",
            "--dim",
            "3",
            "--group",
            "sqrt(1/2):2",
            "--exact",
        ]);
        match cli.cmd {
            Command::Fsd { dim, group, exact } => {
                assert_eq!(dim, 3);
                assert_eq!(group, vec!["sqrt(1/2):2".to_string()]);
                assert!(exact);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_verify() {
        let cli = Cli::parse_from(["orbitquad", "verify", "--scheme", "gl3", "--probe"]);
        match cli.cmd {
            Command::Verify {
                scheme,
                bound,
                probe,
                exact,
                ..
            } => {
                assert_eq!(scheme, "gl3");
                assert_eq!(bound, 30);
                assert!(probe);
                assert!(!exact);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_barycentric_orbit_arity() {
        assert!(barycentric_orbit::<f64>("S21", vec![0.1]).is_ok());
        assert!(barycentric_orbit::<f64>("s21", vec![]).is_err());
        assert!(barycentric_orbit::<f64>("s5", vec![]).is_err());
    }

    #[test]
    fn test_parse_scalar_modes() {
        assert_eq!(parse_scalar::<Surd>("sqrt(8)").unwrap().to_string(), "2*sqrt(2)");
        assert!(parse_scalar::<Surd>("pi").is_err());
        assert!((parse_scalar::<f64>("pi/2").unwrap() - std::f64::consts::FRAC_PI_2).abs() < 1e-15);
    }

    #[test]
    fn test_expansion_commands_run() {
        run_fsd::<f64>(3, &["2:1".to_string()]).unwrap();
        run_pm_array0::<Surd>(2, &["1/2".to_string()], vec![1]).unwrap();
        assert!(run_pm_array0::<f64>(2, &["1".to_string(), "2".to_string()], vec![0, 0]).is_err());
        run_verify::<Surd>("gl2", None, &VerifyOptions::default()).unwrap();
    }
}
