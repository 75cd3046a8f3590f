//! # Storefront Commands
//!
//! Each command takes the session by reference and returns a result the
//! caller renders. [`parse`] and [`execute`] wire them to the command line
//! and the interactive shell.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "add 2 first=Ada last=Obi ..."                                         │
//! │        │ split_line                                                     │
//! │        ▼                                                                │
//! │  ["add", "2", "first=Ada", ...]                                         │
//! │        │ parse                                                          │
//! │        ▼                                                                │
//! │  Command::Add { count, buyer }                                          │
//! │        │ execute(&Storefront)                                           │
//! │        ▼                                                                │
//! │  cart::add_tickets ──► "Added 2 ticket(s) as <id>"                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;
pub mod checkout;
pub mod contact;
pub mod newsletter;
pub mod pricing;

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::PathBuf;

use marquee_core::{ContactDetails, ContactMessage};

use crate::error::StorefrontResult;
use crate::Storefront;

pub const HELP: &str = "\
Commands:
  price [--refresh]                 show the ticket price
  add <count> first=.. last=.. email=.. phone=.. location=.. whatsapp=..
                                    add tickets to the cart
  cart                              list the cart
  remove <id>                       remove a cart item
  qty <id> <count>                  change an item's ticket count
  clear                             empty the cart
  checkout <receipt-file>           submit the cart with a payment receipt
  contact first=.. last=.. email=.. message=..
                                    send a message
  subscribe <email>                 join the newsletter
  help                              show this text
  quit                              leave the shell

Quote values that contain spaces: location=\"Victoria Island, Lagos\"";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Price { refresh: bool },
    Add { count: i64, buyer: ContactDetails },
    Cart,
    Remove { id: String },
    Quantity { id: String, count: i64 },
    Clear,
    Checkout { receipt: PathBuf },
    Contact(ContactMessage),
    Subscribe { email: String },
    Help,
    Quit,
}

/// Parses one command from its words.
pub fn parse(args: &[String]) -> Result<Command, String> {
    let Some((name, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };

    match name.as_str() {
        "price" => Ok(Command::Price {
            refresh: rest.iter().any(|a| a == "--refresh"),
        }),
        "add" => {
            let (count, fields) = rest
                .split_first()
                .ok_or_else(|| "usage: add <count> first=.. last=.. ...".to_string())?;
            let count = parse_count(count)?;
            let mut fields = parse_fields(fields)?;
            let buyer = ContactDetails {
                first_name: fields.remove("first").unwrap_or_default(),
                last_name: fields.remove("last").unwrap_or_default(),
                email: fields.remove("email").unwrap_or_default(),
                phone: fields.remove("phone").unwrap_or_default(),
                location: fields.remove("location").unwrap_or_default(),
                whatsapp: fields.remove("whatsapp").unwrap_or_default(),
            };
            reject_unknown(fields)?;
            Ok(Command::Add { count, buyer })
        }
        "cart" | "list" => Ok(Command::Cart),
        "remove" | "rm" => match rest {
            [id] => Ok(Command::Remove { id: id.clone() }),
            _ => Err("usage: remove <id>".into()),
        },
        "qty" => match rest {
            [id, count] => Ok(Command::Quantity {
                id: id.clone(),
                count: parse_count(count)?,
            }),
            _ => Err("usage: qty <id> <count>".into()),
        },
        "clear" => Ok(Command::Clear),
        "checkout" => match rest {
            [path] => Ok(Command::Checkout {
                receipt: PathBuf::from(path),
            }),
            _ => Err("usage: checkout <receipt-file>".into()),
        },
        "contact" => {
            let mut fields = parse_fields(rest)?;
            let message = ContactMessage {
                first_name: fields.remove("first").unwrap_or_default(),
                last_name: fields.remove("last").unwrap_or_default(),
                email: fields.remove("email").unwrap_or_default(),
                message: fields.remove("message").unwrap_or_default(),
            };
            reject_unknown(fields)?;
            Ok(Command::Contact(message))
        }
        "subscribe" => match rest {
            [email] => Ok(Command::Subscribe {
                email: email.clone(),
            }),
            _ => Err("usage: subscribe <email>".into()),
        },
        "help" | "--help" | "-h" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}

/// Runs a command and renders its outcome as text.
pub async fn execute(sf: &Storefront, command: Command) -> StorefrontResult<String> {
    match command {
        Command::Price { refresh } => {
            let price = if refresh {
                pricing::refresh_price(sf).await
            } else {
                pricing::ticket_price(sf).await
            };
            Ok(format!("Ticket price: {price}"))
        }
        Command::Add { count, buyer } => {
            let id = cart::add_tickets(sf, count, &buyer).await?;
            Ok(format!("Added {count} ticket(s) as {id}"))
        }
        Command::Cart => Ok(render_cart(&cart::list_cart(sf))),
        Command::Remove { id } => {
            cart::remove_item(sf, &id)?;
            Ok(format!("Removed {id}"))
        }
        Command::Quantity { id, count } => {
            cart::set_quantity(sf, &id, count)?;
            Ok(format!("{id} now has {count} ticket(s)"))
        }
        Command::Clear => {
            cart::clear_cart(sf);
            Ok("Cart cleared".into())
        }
        Command::Checkout { receipt } => {
            let ack = checkout::checkout(sf, &receipt).await?;
            Ok(match ack.reference {
                Some(reference) => format!("{} (reference {reference})", ack.message),
                None => ack.message,
            })
        }
        Command::Contact(message) => Ok(contact::send_contact(sf, &message).await?.message),
        Command::Subscribe { email } => Ok(newsletter::subscribe(sf, &email).await?.message),
        Command::Help => Ok(HELP.into()),
        Command::Quit => Ok(String::new()),
    }
}

fn render_cart(view: &cart::CartView) -> String {
    if view.items.is_empty() {
        return "Your cart is empty".into();
    }

    let mut out = String::new();
    for item in &view.items {
        let c = item.contact();
        let _ = writeln!(
            out,
            "{}  {} x {} = {}  {} {} <{}>",
            item.id(),
            item.ticket_count(),
            item.unit_price(),
            item.total_price(),
            c.first_name,
            c.last_name,
            c.email
        );
    }
    let _ = write!(
        out,
        "{} ticket(s) across {} item(s), total {}",
        view.totals.item_count, view.totals.line_count, view.totals.grand_total
    );
    out
}

// =============================================================================
// Argument Helpers
// =============================================================================

/// Splits a shell line into words. Double quotes group words; there are no
/// escapes.
pub fn split_line(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quoted {
        return Err("unterminated quote".into());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

fn parse_count(raw: &str) -> Result<i64, String> {
    raw.parse()
        .map_err(|_| format!("'{raw}' is not a whole number"))
}

fn parse_fields(args: &[String]) -> Result<HashMap<String, String>, String> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| format!("expected key=value, got '{arg}'"))
        })
        .collect()
}

fn reject_unknown(fields: HashMap<String, String>) -> Result<(), String> {
    match fields.keys().next() {
        Some(key) => Err(format!("unknown field '{key}'")),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::session;

    fn words(line: &str) -> Vec<String> {
        split_line(line).unwrap()
    }

    #[test]
    fn test_split_line_quotes() {
        assert_eq!(
            words(r#"add 1 location="Victoria Island, Lagos"  first=Ada"#),
            vec!["add", "1", "location=Victoria Island, Lagos", "first=Ada"]
        );
        assert_eq!(words(r#"subscribe """#), vec!["subscribe", ""]);
        assert!(words("   ").is_empty());
        assert!(split_line(r#"contact message="oops"#).is_err());
    }

    #[test]
    fn test_parse_add() {
        let cmd = parse(&words(
            "add 3 first=Ada last=Obi email=ada@example.com phone=08012345678 location=Lagos whatsapp=08012345678",
        ))
        .unwrap();
        match cmd {
            Command::Add { count, buyer } => {
                assert_eq!(count, 3);
                assert_eq!(buyer.first_name, "Ada");
                assert_eq!(buyer.whatsapp, "08012345678");
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(parse(&words("add three first=Ada")).is_err());
        assert!(parse(&words("add 1 nickname=Ace")).is_err());
        assert!(parse(&words("add")).is_err());
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse(&[]).unwrap(), Command::Help);
        assert_eq!(parse(&words("list")).unwrap(), Command::Cart);
        assert_eq!(
            parse(&words("price --refresh")).unwrap(),
            Command::Price { refresh: true }
        );
        assert_eq!(
            parse(&words("qty abc 4")).unwrap(),
            Command::Quantity {
                id: "abc".into(),
                count: 4
            }
        );
        assert!(parse(&words("qty abc")).is_err());
        assert!(parse(&words("dance")).is_err());
        assert_eq!(parse(&words("exit")).unwrap(), Command::Quit);
    }

    #[tokio::test]
    async fn test_execute_session() {
        let (sf, _api) = session();

        let out = execute(&sf, Command::Cart).await.unwrap();
        assert_eq!(out, "Your cart is empty");

        let add = parse(&words(
            "add 2 first=Ada last=Obi email=ada@example.com phone=08012345678 location=Lagos whatsapp=08012345678",
        ))
        .unwrap();
        let out = execute(&sf, add).await.unwrap();
        assert!(out.starts_with("Added 2 ticket(s) as "));

        let out = execute(&sf, Command::Cart).await.unwrap();
        assert!(out.ends_with("2 ticket(s) across 1 item(s), total ₦12,998.00"));

        let out = execute(&sf, Command::Subscribe { email: "fan@example.org".into() })
            .await
            .unwrap();
        assert_eq!(out, "Subscribed successfully");

        let err = execute(&sf, Command::Remove { id: "missing".into() })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No cart item with id missing");
    }
}
