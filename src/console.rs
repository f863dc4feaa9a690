//! Terminal front end: a map surface that prints what it is told to draw,
//! a notifier that prints notices, and the command line parser.

use storecheck::map::{FitRequest, MapSurface, MarkerId, MarkerRole, RecordingMap};
use storecheck::notice::{LogNotifier, Notice, Notifier, Severity};
use storecheck::{Coordinates, SelectionChanged, UiEvent};

pub struct ConsoleMap {
    inner: RecordingMap,
}

impl ConsoleMap {
    pub fn new(width_px: u32) -> Self {
        Self {
            inner: RecordingMap::new(width_px),
        }
    }

    fn flush(&mut self) {
        for command in self.inner.take_commands() {
            println!("  map: {command}");
        }
    }
}

impl MapSurface for ConsoleMap {
    type Marker = MarkerId;

    fn create_marker(&mut self, role: MarkerRole, at: Coordinates) -> MarkerId {
        let marker = self.inner.create_marker(role, at);
        self.flush();
        marker
    }

    fn move_marker(&mut self, marker: &MarkerId, at: Coordinates) {
        self.inner.move_marker(marker, at);
        self.flush();
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        self.inner.remove_marker(marker);
        self.flush();
    }

    fn fly_to(&mut self, center: Coordinates, zoom: f64) {
        self.inner.fly_to(center, zoom);
        self.flush();
    }

    fn fit_bounds(&mut self, fit: FitRequest) {
        self.inner.fit_bounds(fit);
        self.flush();
    }

    fn viewport_width(&self) -> u32 {
        self.inner.viewport_width()
    }
}

/// Prints notices and also sends them to the log
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    log: LogNotifier,
}

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, notice: Notice) {
        let icon = match notice.severity {
            Severity::Alert => "🚨",
            Severity::Warning => "⚠️",
        };
        println!("{icon} {}", notice.message);
        self.log.notify(notice);
    }
}

/// One line typed by the user
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ui(UiEvent),
    List,
    Search(String),
    Goto(Coordinates),
    Deny,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  list                 show every business
  search <text>        filter businesses by name or id
  select <id>          pick a business
  clear                clear the selection
  refresh              locate the device again
  checkin              check in at the selected business
  confirm              report a new location after a too-far check-in
  goto <lat> <lon>     move the simulated device
  deny                 make the simulated device refuse location requests
  quit                 leave";

pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err("empty command".to_string());
    };
    let rest: Vec<&str> = words.collect();

    let command = match (verb.to_lowercase().as_str(), rest.as_slice()) {
        ("list", []) => Command::List,
        ("search", words) => Command::Search(words.join(" ")),
        ("select", [id]) => {
            let selection = SelectionChanged::Selected((*id).to_string());
            Command::Ui(UiEvent::SelectionChanged(selection))
        }
        ("clear", []) => Command::Ui(UiEvent::SelectionChanged(SelectionChanged::Cleared)),
        ("refresh", []) => Command::Ui(UiEvent::RefreshLocation),
        ("checkin", []) => Command::Ui(UiEvent::CheckIn),
        ("confirm", []) => Command::Ui(UiEvent::ConfirmLocationUpdate),
        ("goto", [lat, lon]) => {
            let Ok(lat) = lat.parse::<f64>() else {
                return Err(format!("invalid latitude '{lat}'"));
            };
            let Ok(lon) = lon.parse::<f64>() else {
                return Err(format!("invalid longitude '{lon}'"));
            };
            let position = Coordinates::new(lat, lon);
            if !position.is_valid() {
                return Err(format!("{lat}, {lon} is not a valid position"));
            }
            Command::Goto(position)
        }
        ("deny", []) => Command::Deny,
        ("help" | "?", []) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        (verb, _) => return Err(format!("unknown command '{verb}', try 'help'")),
    };
    Ok(command)
}
