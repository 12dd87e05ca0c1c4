use anyhow::{Context, Result};
use changing_mazes::CLIArgs;
use clap::Parser;

fn main() -> Result<()> {
    env_logger::init();

    let args = CLIArgs::parse();
    let grid = changing_mazes::read_grid(&args.input_path).with_context(|| {
        format!(
            "Failed to read maze from given file({}).",
            args.input_path.display()
        )
    })?;

    if args.verbose {
        println!(
            "Maze of {}x{} cells, {} barrier(s) worth removing.",
            grid.width(),
            grid.height(),
            grid.barrier_candidates().len()
        );
    }

    let shortest_len = if args.parallel {
        changing_mazes::solve_parallel(&grid)
    } else {
        changing_mazes::solve(&grid)
    };

    if let Some(len) = shortest_len {
        println!("The shortest path through the maze visits {} cell(s).", len);
    } else {
        eprintln!("There's no path through the given maze, even with one barrier removed.");
    }

    Ok(())
}
