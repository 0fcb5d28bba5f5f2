use std::process::ExitCode;

use clap::Parser;
use ratatui::DefaultTerminal;
use tracing::info;

use csvv::ViewerError;
use csvv::cli::{Args, run_batch};
use csvv::controller::Controller;
use csvv::logging::init_logging;
use csvv::model::{Model, Status};
use csvv::ui::TableUI;

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(args: Args) -> Result<(), ViewerError> {
    init_logging(&args.log_file_path()?, &args.log_level)?;

    if args.export {
        let location = run_batch(&args)?;
        println!("{location}");
        return Ok(());
    }

    let path = args.input_path()?;
    let cfg = args.config()?;
    let table = Model::load_data_file(&path)?;
    info!("Starting csvv for {}", path.display());

    let mut terminal = ratatui::init();
    let result = terminal
        .size()
        .map_err(ViewerError::from)
        .and_then(|size| {
            let model = Model::init(
                &cfg,
                args.title_for(&path),
                table,
                size.width as usize,
                size.height as usize,
            );
            event_loop(&mut terminal, model, &cfg)
        });
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    mut model: Model,
    cfg: &csvv::ViewerConfig,
) -> Result<(), ViewerError> {
    let ui = TableUI::new();
    let controller = Controller::new(cfg);

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(Some(message))?;
        };
    }

    Ok(())
}
