//! Interactive order-entry loop
//!
//! Reads one command per line. A pasted block is entered after `paste` and
//! ends with a line holding a single `.`.

use std::io::{self, BufRead, Write};

use balju::prelude::*;
use tracing::{debug, warn};

use crate::render;

const HELP: &str = "\
Commands:
  set <field> <value>       set a form field (key or label, see `form`)
  address <store>           fill the address field from the address sheet
  form                      show the form
  lookup [code]             show what a code resolves to (default: form code)
  add                       add the form's code with the form's header
  paste                     paste rows, end with a line holding only '.'
  list                      show the order list
  del <n> [n...]            delete items by their listed number
  clear                     delete every item
  export <path> [--overwrite]
                            export the list (.xlsb appends to 발주내역)
  help                      show this help
  quit                      leave the session";

/// A clerk session over `input` and `output`
pub struct Session<R, W> {
    desk: Desk,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(desk: Desk, input: R, output: W) -> Self {
        Self {
            desk,
            input,
            output,
        }
    }

    /// Run until `quit` or end of input
    pub fn run(&mut self) -> io::Result<()> {
        self.load_status()?;
        writeln!(self.output, "Type `help` for commands.")?;
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (command, rest) = match line.split_once(char::is_whitespace) {
                Some((command, rest)) => (command, rest.trim()),
                None => (line, ""),
            };
            debug!(command, "session command");

            match command {
                "quit" | "exit" | "q" => break,
                "help" | "?" => writeln!(self.output, "{HELP}")?,
                "set" => self.set(rest)?,
                "address" => self.address(rest)?,
                "form" => render::form(&mut self.output, self.desk.form())?,
                "lookup" => self.lookup(rest)?,
                "add" => self.add()?,
                "paste" => self.paste()?,
                "list" | "ls" => render::book(&mut self.output, self.desk.book())?,
                "del" | "rm" => self.delete(rest)?,
                "clear" => {
                    self.desk.clear();
                    writeln!(self.output, "Order list cleared")?;
                }
                "export" => self.export(rest)?,
                other => writeln!(self.output, "Unknown command '{other}'; try `help`")?,
            }
        }
        Ok(())
    }

    /// Report how the master workbook loaded, if the desk was opened from one
    fn load_status(&mut self) -> io::Result<()> {
        let Some(master) = self.desk.master_path() else {
            return Ok(());
        };
        match self.desk.load_error() {
            Some(err) => {
                warn!(path = %master.display(), "continuing without master data");
                writeln!(
                    self.output,
                    "Warning: master data not loaded ({err}); every code will be manual"
                )
            }
            None => writeln!(
                self.output,
                "Loaded {} products and {} addresses from '{}'",
                self.desk.catalog().products.len(),
                self.desk.catalog().addresses.len(),
                master.display()
            ),
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn set(&mut self, args: &str) -> io::Result<()> {
        let (name, value) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
        match name.parse::<FormField>() {
            Ok(field) => {
                self.desk.set_field(field, value.trim());
                if field == FormField::Barcode {
                    self.show_preview()?;
                }
                Ok(())
            }
            Err(e) => writeln!(self.output, "{e}"),
        }
    }

    fn address(&mut self, store: &str) -> io::Result<()> {
        match self.desk.address_of(store).map(str::to_string) {
            Some(address) => {
                writeln!(self.output, "{address}")?;
                self.desk.set_field(FormField::Address, address);
                Ok(())
            }
            None => writeln!(self.output, "No address recorded for store '{store}'"),
        }
    }

    fn lookup(&mut self, code: &str) -> io::Result<()> {
        if !code.is_empty() {
            self.desk.set_field(FormField::Barcode, code);
        }
        self.show_preview()
    }

    fn show_preview(&mut self) -> io::Result<()> {
        let code = self.desk.form().barcode.trim().to_string();
        if code.is_empty() {
            return writeln!(self.output, "No product code entered");
        }
        let preview = self.desk.preview();
        if preview.is_empty() {
            writeln!(self.output, "'{code}' is not in the catalog")
        } else {
            render::items(&mut self.output, &preview)
        }
    }

    fn add(&mut self) -> io::Result<()> {
        let Self {
            desk,
            input,
            output,
        } = self;

        let mut io_error = None;
        let mut confirm = |code: &str| -> bool {
            let answer = write!(
                output,
                "'{code}' is not in the catalog. Add it as a manual line? [y/N] "
            )
            .and_then(|_| output.flush())
            .and_then(|_| {
                let mut line = String::new();
                input.read_line(&mut line).map(|_| line)
            });
            match answer {
                Ok(line) => matches!(line.trim(), "y" | "Y" | "yes"),
                Err(e) => {
                    io_error = Some(e);
                    false
                }
            }
        };

        let result = desk.add(&mut confirm);
        if let Some(e) = io_error {
            return Err(e);
        }

        match result {
            Ok(AddOutcome::Added { items, matched }) => writeln!(
                output,
                "Added {items} item(s){}; {} in list",
                if matched { "" } else { " as manual" },
                desk.book().len()
            ),
            Ok(AddOutcome::Declined) => writeln!(output, "Not added"),
            Err(e) => writeln!(output, "{e}"),
        }
    }

    fn paste(&mut self) -> io::Result<()> {
        writeln!(self.output, "Paste rows, then a line with a single '.':")?;
        let mut text = String::new();
        while let Some(line) = self.read_line()? {
            if line.trim() == "." {
                break;
            }
            text.push_str(&line);
        }

        match self.desk.paste(&text) {
            PasteOutcome::Empty => writeln!(self.output, "Nothing pasted"),
            PasteOutcome::Filled { preview } => {
                writeln!(self.output, "Form filled; review with `form`, then `add`")?;
                if preview.is_empty() {
                    let code = self.desk.form().barcode.clone();
                    writeln!(self.output, "'{code}' is not in the catalog")
                } else {
                    render::items(&mut self.output, &preview)
                }
            }
            PasteOutcome::Batch(report) => render::batch_report(&mut self.output, &report),
        }
    }

    fn delete(&mut self, args: &str) -> io::Result<()> {
        let mut indices = Vec::new();
        for arg in args.split_whitespace() {
            match arg.parse::<usize>() {
                Ok(n) if n >= 1 => indices.push(n - 1),
                _ => return writeln!(self.output, "Not an item number: '{arg}'"),
            }
        }
        if indices.is_empty() {
            return writeln!(self.output, "Select items to delete, e.g. `del 2 3`");
        }

        let removed = self.desk.remove(&indices);
        writeln!(
            self.output,
            "Deleted {} item(s); {} in list",
            removed.len(),
            self.desk.book().len()
        )
    }

    fn export(&mut self, args: &str) -> io::Result<()> {
        let (path, mode) = match export_args(args) {
            Ok(parsed) => parsed,
            Err(message) => {
                writeln!(self.output, "{message}")?;
                return writeln!(self.output, "Usage: export <path> [--overwrite]");
            }
        };

        match self.desk.export(path, mode) {
            Ok(report) => render::export_report(&mut self.output, &report),
            Err(e) => writeln!(self.output, "Export failed: {e}"),
        }
    }
}

/// Split `export` arguments into the destination and the mode.
///
/// Flags are only taken from the start or the end; everything between them
/// is the path, spaces included. A path may be wrapped in double quotes.
fn export_args(args: &str) -> Result<(String, AppendMode), String> {
    let mut rest = args.trim();
    let mut mode = AppendMode::Append;
    while let Some((flag, remaining)) = take_flag(rest) {
        mode = flag;
        rest = remaining;
    }

    let path = match rest.strip_prefix('"') {
        Some(quoted) => quoted
            .strip_suffix('"')
            .filter(|inner| !inner.contains('"'))
            .ok_or_else(|| format!("Unbalanced quotes in '{rest}'"))?,
        None => rest,
    };

    if path.is_empty() {
        return Err("No destination given".to_string());
    }
    if let Some(extra) = path.split_whitespace().find(|token| token.starts_with("--")) {
        return Err(format!("Unexpected option '{extra}'"));
    }
    Ok((path.to_string(), mode))
}

/// Strip one mode flag from either end of `args`
fn take_flag(args: &str) -> Option<(AppendMode, &str)> {
    const FLAGS: [(&str, AppendMode); 2] = [
        ("--overwrite", AppendMode::Overwrite),
        ("--append", AppendMode::Append),
    ];

    for (flag, mode) in FLAGS {
        if let Some(after) = args.strip_prefix(flag) {
            if after.is_empty() || after.starts_with(char::is_whitespace) {
                return Some((mode, after.trim_start()));
            }
        }
        if let Some(before) = args.strip_suffix(flag) {
            if before.is_empty() || before.ends_with(char::is_whitespace) {
                return Some((mode, before.trim_end()));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn desk() -> Desk {
        Desk::new(Catalog {
            products: ProductTable::from_rows(vec![
                ProductRow::new("B2504240301", "DUALFIXPRO-TEAK").with_gift(1, "G001"),
                ProductRow::new("G001", "Gift Set"),
            ]),
            addresses: AddressTable::empty(),
        })
    }

    fn run(script: &str) -> (Desk, String) {
        let mut session = Session::new(desk(), Cursor::new(script.to_string()), Vec::new());
        session.run().unwrap();
        let Session { desk, output, .. } = session;
        (desk, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_missing_master_warns() {
        let dir = tempfile::tempdir().unwrap();
        let master = dir.path().join("absent.xlsb");
        let desk = Desk::open(&master, &CatalogLayout::default());
        let mut session = Session::new(desk, Cursor::new("quit\n".to_string()), Vec::new());
        session.run().unwrap();

        let output = String::from_utf8(session.output).unwrap();
        assert!(
            output.starts_with("Warning: master data not loaded"),
            "{output}"
        );
        assert!(output.contains("every code will be manual"));
    }

    #[test]
    fn test_set_and_add() {
        let (desk, output) = run("set partner Acme Corp\nset barcode B2504240301\nset qty 2\nadd\n");

        assert!(output.contains("unknown field 'qty'"));
        assert!(output.contains("Added 2 item(s); 2 in list"));
        assert_eq!(desk.book().len(), 2);
        assert_eq!(desk.book().items()[0].header.partner, "Acme Corp");
        assert_eq!(desk.form().barcode, "");
    }

    #[test]
    fn test_unknown_code_confirmation() {
        let (desk, output) = run("set barcode X1\nadd\nn\nadd\ny\n");

        assert!(output.contains("Not added"));
        assert!(output.contains("Added 1 item(s) as manual; 1 in list"));
        assert_eq!(desk.book().items()[0].kind, ItemKind::Manual);
    }

    #[test]
    fn test_paste_batch_then_delete() {
        let line = |code: &str| format!("Acme\tKim\tLee\t\t\t\t\t\t{code}\t\t\t3\n");
        let script = format!(
            "paste\n{}{}.\nlist\ndel 1 0\ndel 2\nlist\n",
            line("B2504240301"),
            line("NEW-1")
        );
        let (desk, output) = run(&script);

        assert!(output.contains("Added 2 row(s), 3 item(s); 1 manual; 0 failed"));
        assert!(output.contains("Not an item number: '0'"));
        assert!(output.contains("Deleted 1 item(s); 2 in list"));
        let codes: Vec<_> = desk
            .book()
            .iter()
            .map(|i| i.product_code.as_str())
            .collect();
        assert_eq!(codes, vec!["B2504240301", "NEW-1"]);
    }

    #[test]
    fn test_single_paste_fills_form() {
        let (desk, output) = run("paste\nAcme\tKim\tLee\t\t\t\t\t\tB2504240301\n.\n");

        assert!(output.contains("Form filled"));
        assert!(output.contains("GIFT    G001"));
        assert!(desk.book().is_empty());
        assert_eq!(desk.form().header.quantity, "1");
        assert_eq!(desk.form().barcode, "B2504240301");
    }

    #[test]
    fn test_export_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let (_, output) = run(&format!("export {}\nquit\nlist\n", path.display()));

        assert!(output.contains("Export failed"));
        assert!(!output.contains("order list is empty"));
        assert!(!path.exists());
    }

    #[test]
    fn test_export_path_with_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("my orders.xlsx");
        let (desk, output) = run(&format!(
            "set barcode B2504240301\nadd\nexport {}\n",
            path.display()
        ));

        assert!(output.contains("Wrote 2 row(s)"), "{output}");
        assert!(path.exists());
        assert!(!dir.path().join("orders.xlsx").exists());
        assert_eq!(desk.book().len(), 2);
    }

    #[test]
    fn test_export_args() {
        assert_eq!(
            export_args("/home/clerk/my orders.xlsx"),
            Ok(("/home/clerk/my orders.xlsx".to_string(), AppendMode::Append))
        );
        assert_eq!(
            export_args(r"C:\Sales Data\book.xlsb --overwrite"),
            Ok((r"C:\Sales Data\book.xlsb".to_string(), AppendMode::Overwrite))
        );
        assert_eq!(
            export_args("--overwrite \"a b.xlsb\""),
            Ok(("a b.xlsb".to_string(), AppendMode::Overwrite))
        );
        assert!(export_args("a.xlsx --overwrite b.xlsx").is_err());
        assert!(export_args("\"a.xlsx").is_err());
        assert!(export_args("--overwrite").is_err());
        assert!(export_args("").is_err());
    }

    #[test]
    fn test_export_rejects_extra_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let (_, output) = run(&format!(
            "set barcode G001\nadd\nexport {}/a.xlsx --overwrite b.xlsx\n",
            dir.path().display()
        ));

        assert!(output.contains("Unexpected option '--overwrite'"));
        assert!(!dir.path().join("a.xlsx").exists());
    }
}
