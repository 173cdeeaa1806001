use crate::helpe::*;

/// Defines the interface for reading scenarios.
///
/// For example: [CsvParser] reads a CSV file with one process per
/// line, and [PromptParser] asks a human, one number at a time.
///
/// The user can implement their own types as needed. Whatever comes
/// out of [`read_specs`](ScenarioGen::read_specs) still has to go
/// through [`init`] before a simulation can start.
pub trait ScenarioGen<T> {
    /// Either every spec is successfully returned, in arrival-index
    /// order, or the reason why the input is unusable.
    fn read_specs(&mut self) -> Result<Vec<ProcessSpec>, SetupError>;
    /// Uses some available data to spawn one [ProcessSpec].
    fn gen_single(&self, d: T) -> ProcessSpec;
}

fn parse_field(raw: &str, what: &str, line: usize) -> Result<usize, SetupError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| SetupError::Malformed {
            line,
            reason: format!("bad {} {:?} ({})", what, raw.trim(), e),
        })
}

/// Reads `arrival,service,size` records. The first line is a header
/// and is skipped, as are blank lines and lines starting with `#`.
pub struct CsvParser<R> {
    source: R,
}

impl<R: BufRead> CsvParser<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }
}

impl CsvParser<BufReader<std::fs::File>> {
    pub fn from_path(path: &std::path::Path) -> Result<Self, SetupError> {
        let fd = std::fs::File::open(path)?;

        Ok(Self::new(BufReader::new(fd)))
    }
}

const CSV_FIELDS: [&str; 3] = ["arrival time", "service time", "size"];

impl<R: BufRead> ScenarioGen<&[usize; 3]> for CsvParser<R> {
    fn read_specs(&mut self) -> Result<Vec<ProcessSpec>, SetupError> {
        let mut records: Vec<[usize; 3]> = vec![];
        let mut data_buf: [usize; 3] = [0; 3];

        for (idx, line) in (&mut self.source).lines()
            .enumerate()
            // First line is the header!
            .skip(1) {
            let line_no = idx + 1;
            let line = line?;
            let record = line.trim();
            if record.is_empty() || record.starts_with('#') {
                continue;
            }
            let fields = record.split(',').collect_vec();
            if fields.len() != CSV_FIELDS.len() {
                return Err(SetupError::Malformed {
                    line:   line_no,
                    reason: format!("expected {} fields, found {}", CSV_FIELDS.len(), fields.len()),
                });
            }
            for (slot, (raw, what)) in data_buf.iter_mut().zip(fields.iter().zip(CSV_FIELDS)) {
                *slot = parse_field(raw, what, line_no)?;
            }
            records.push(data_buf);
        }
        debug!("Read {} process specs from CSV.", records.len());

        Ok(records.iter()
            .map(|d| self.gen_single(d))
            .collect())
    }

    fn gen_single(&self, d: &[usize; 3]) -> ProcessSpec {
        ProcessSpec::new(d[0], d[1], d[2])
    }
}

/// Interactive setup: asks for the process count and then for the
/// details of each process, reading one answer per line.
///
/// A count outside `min_processes..=max_processes` is not accepted;
/// the question is simply asked again.
pub struct PromptParser<R, W> {
    input:          R,
    prompt:         W,
    min_processes:  usize,
    max_processes:  usize,
    answers_read:   usize,
}

impl<R: BufRead, W: Write> PromptParser<R, W> {
    pub fn new(input: R, prompt: W, cfg: &SimConfig) -> Self {
        Self {
            input,
            prompt,
            min_processes:  cfg.min_processes,
            max_processes:  cfg.max_processes,
            answers_read:   0,
        }
    }

    fn ask(&mut self, question: &str, what: &str) -> Result<usize, SetupError> {
        write!(self.prompt, "{}", question)?;
        self.prompt.flush()?;
        let mut answer = String::new();
        self.answers_read += 1;
        if self.input.read_line(&mut answer)? == 0 {
            return Err(SetupError::Malformed {
                line:   self.answers_read,
                reason: String::from("unexpected end of input"),
            });
        }

        parse_field(&answer, what, self.answers_read)
    }
}

impl<R: BufRead, W: Write> ScenarioGen<(Ticks, Ticks, MemUnits)> for PromptParser<R, W> {
    fn read_specs(&mut self) -> Result<Vec<ProcessSpec>, SetupError> {
        let count = loop {
            let question = format!(
                "Enter the total number of processes (minimum {}, maximum {}): ",
                self.min_processes,
                self.max_processes,
            );
            let n = self.ask(&question, "process count")?;
            if n < self.min_processes {
                writeln!(self.prompt, "At least {} processes required.", self.min_processes)?;
            } else if n > self.max_processes {
                writeln!(self.prompt, "At most {} processes supported.", self.max_processes)?;
            } else {
                break n;
            }
        };

        let mut res = Vec::with_capacity(count);
        for id in 1..=count {
            writeln!(self.prompt, "\nEnter details for Process {}:", id)?;
            let arrival = self.ask("Arrival Time: ", "arrival time")?;
            let service = self.ask("Execution Time: ", "execution time")?;
            let size = self.ask("Size: ", "size")?;
            res.push(self.gen_single((arrival, service, size)));
        }

        Ok(res)
    }

    fn gen_single(&self, d: (Ticks, Ticks, MemUnits)) -> ProcessSpec {
        ProcessSpec::new(d.0, d.1, d.2)
    }
}

/// Reads a CSV scenario from `file_path` and sets up a
/// ready-to-run [Simulation].
pub fn read_from_path(file_path: PathBuf, cfg: SimConfig) -> Result<Simulation, SetupError> {
    let specs = CsvParser::from_path(&file_path)?.read_specs()?;

    Simulation::new(cfg, specs)
}
