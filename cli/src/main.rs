use std::env;
use std::io;
use std::io::Write;
use std::process;

use tracing::info;
use tracing_subscriber::EnvFilter;

use featchart::{AgendaOrder, Err, Grammar, Parser, Tree};

fn usage(prog_name: &str) -> String {
  format!(
    r"Usage: {} STEM [options]

Loads STEM.g and STEM.lex, then parses one sentence per line from stdin.

Options:
  -h, --help     Print this message
  -c, --chart    Print the parse chart (defaults to not printing)
  -f, --fifo     Process the agenda oldest-first instead of newest-first
  -b, --bare     Print only head symbols, without features
  -n, --max N    Print at most N trees (defaults to all)
  -g, --generate Print a sentence the grammar generates, then exit

Set RUST_LOG=featchart=debug (or trace) to log what the parser is doing.",
    prog_name
  )
}

struct Args {
  stem: String,
  print_chart: bool,
  bare: bool,
  order: AgendaOrder,
  max_trees: Option<usize>,
  generate: bool,
}

impl Args {
  fn make_error_message(msg: &str, prog_name: impl AsRef<str>) -> String {
    format!("argument error: {}.\n\n{}", msg, usage(prog_name.as_ref()))
  }

  fn parse(v: Vec<String>) -> Result<Self, String> {
    if v.is_empty() {
      return Err(Self::make_error_message("bad argument vector", "featchart"));
    }

    let args_len = v.len();
    let mut iter = v.into_iter();
    let prog_name = iter.next().unwrap_or_default();

    if args_len < 2 {
      return Err(Self::make_error_message("not enough arguments", prog_name));
    }

    let mut stem: Option<String> = None;
    let mut print_chart = false;
    let mut bare = false;
    let mut order = AgendaOrder::Lifo;
    let mut max_trees = None;
    let mut generate = false;

    while let Some(o) = iter.next() {
      if o == "-h" || o == "--help" {
        println!("{}", usage(&prog_name));
        process::exit(0);
      } else if o == "-c" || o == "--chart" {
        print_chart = true;
      } else if o == "-f" || o == "--fifo" {
        order = AgendaOrder::Fifo;
      } else if o == "-b" || o == "--bare" {
        bare = true;
      } else if o == "-g" || o == "--generate" {
        generate = true;
      } else if o == "-n" || o == "--max" {
        let n = iter
          .next()
          .and_then(|n| n.parse::<usize>().ok())
          .ok_or_else(|| Self::make_error_message("--max needs a number", &prog_name))?;
        max_trees = Some(n);
      } else if stem.is_none() {
        stem = Some(o);
      } else {
        return Err(Self::make_error_message("invalid arguments", prog_name));
      }
    }

    if let Some(stem) = stem {
      Ok(Self {
        stem,
        print_chart,
        bare,
        order,
        max_trees,
        generate,
      })
    } else {
      Err(Self::make_error_message("missing grammar stem", prog_name))
    }
  }
}

fn print_tree(tree: &Tree, bare: bool) {
  if bare {
    println!("{}", tree.map(|c| c.value.head.name.clone(), |w| w.value.clone()));
  } else {
    println!("{}", tree);
  }
}

fn parse(g: &Grammar, sentence: &str, opts: &Args) {
  let words = sentence.split_whitespace().collect::<Vec<_>>();

  let mut parser = Parser::new(g).with_agenda_order(opts.order);
  let forest = parser.parse(&words);

  if opts.print_chart {
    println!("chart:\n{}", forest.chart());
  }

  let trees = match opts.max_trees {
    Some(n) => forest.first(n),
    None => forest.trees().collect(),
  };

  println!(
    "Parsed {} tree{}",
    trees.len(),
    if trees.len() == 1 { "" } else { "s" }
  );

  for t in trees.iter() {
    print_tree(t, opts.bare);
    println!();
  }
}

fn main() -> Result<(), Err> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(io::stderr)
    .init();

  let opts = match Args::parse(env::args().collect()) {
    Ok(opts) => opts,
    Err(msg) => {
      eprintln!("{}", msg);
      process::exit(255);
    }
  };

  let g = Grammar::read_from_files(&opts.stem)?;
  info!(stem = %opts.stem, rules = g.rules.len(), words = g.lexicon().len(), "loaded grammar");

  if opts.generate {
    let tree = g.generate()?;
    println!("{}", tree.terminal_string());
    print_tree(&tree, opts.bare);
    return Ok(());
  }

  let mut input = String::new();
  loop {
    print!("> ");
    io::stdout().flush()?;

    match io::stdin().read_line(&mut input) {
      Ok(_) => {
        if input.is_empty() {
          // ctrl+d
          return Ok(());
        }
        parse(&g, input.trim(), &opts);
        input.clear();
      }
      Err(error) => return Err(error.into()),
    }
  }
}
