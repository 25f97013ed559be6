use crate::render;
use anyhow::Context;
use clap::{Args, Subcommand};
use guarda_core::{BlobStore, Department, LedgerStore, NewItem, Role};
use std::io::Write;

/// Credenciais usadas para abrir a sessão desta execução
#[derive(Debug, Clone, Default, Args)]
pub struct Credentials {
    /// Papel: client, cashier, admin, creator ou nikitovsky
    #[arg(long)]
    pub role: Option<Role>,

    /// Telefone (cliente) ou nome de usuário (equipe)
    #[arg(long, default_value = "")]
    pub user: String,

    /// Senha do papel (vazia para cliente)
    #[arg(long, env = "GUARDA_SECRET", hide_env_values = true, default_value = "")]
    pub secret: String,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Só valida as credenciais e sai
    Login,
    /// Registra um item novo (admin, creator, nikitovsky)
    Add(AddArgs),
    /// Entrega um item guardado ao cliente
    Pickup {
        /// ID do item (item-...)
        id: String,
    },
    /// Arquiva um item já entregue (admin, creator, nikitovsky)
    Archive {
        /// ID do item (item-...)
        id: String,
    },
    /// Lista os itens visíveis para a sessão
    List {
        /// Imprime os registros em JSON
        #[arg(long)]
        json: bool,
    },
    /// Ocupação de cada departamento (equipe)
    Stats,
    /// Mostra o limite de cada departamento
    Departments,
}

/// Campos do formulário de entrada
#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub item_name: String,
    #[arg(long, default_value = "")]
    pub first_name: String,
    #[arg(long, default_value = "")]
    pub last_name: String,
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "documents")]
    pub department: Department,
    #[arg(long, default_value = "0", value_parser = parse_amount)]
    pub deposit_amount: f64,
    #[arg(long, default_value = "0", value_parser = parse_amount)]
    pub pickup_amount: f64,
    #[arg(long, default_value = "")]
    pub deposit_date: String,
    #[arg(long, default_value = "")]
    pub pickup_date: String,
}

/// Aceita só valores numéricos finitos (`NaN` e `inf` são recusados)
fn parse_amount(raw: &str) -> Result<f64, String> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' não é um valor numérico"))?;
    if !amount.is_finite() {
        return Err(format!("'{raw}' precisa ser um número finito"));
    }
    Ok(amount)
}

impl From<AddArgs> for NewItem {
    fn from(args: AddArgs) -> Self {
        NewItem {
            item_name: args.item_name,
            first_name: args.first_name,
            last_name: args.last_name,
            phone: args.phone,
            email: args.email,
            department: args.department,
            deposit_amount: args.deposit_amount,
            pickup_amount: args.pickup_amount,
            deposit_date: args.deposit_date,
            pickup_date: args.pickup_date,
        }
    }
}

/// Executa um comando dentro de uma sessão aberta com `credentials`.
/// A sessão é sempre encerrada no fim, com ou sem erro.
pub fn execute<S: BlobStore>(
    store: &mut LedgerStore<S>,
    credentials: &Credentials,
    command: Command,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    if let Command::Departments = command {
        render::departments(out)?;
        return Ok(());
    }

    let role = credentials
        .role
        .context("Informe --role para entrar no sistema")?;
    let role = store.login(role, &credentials.user, &credentials.secret)?;

    let outcome = run_in_session(store, role, command, out);
    store.logout();
    outcome
}

fn run_in_session<S: BlobStore>(
    store: &mut LedgerStore<S>,
    role: Role,
    command: Command,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        Command::Login => writeln!(out, "Credenciais válidas: entrou como {role}")?,
        Command::Add(args) => {
            let record = store.add_item(args.into())?;
            render::record(out, &format!("Item registrado! QR: {}", record.qr_code), &record)?;
        }
        Command::Pickup { id } => {
            let record = store.pickup_item(&id)?;
            render::record(out, "Item entregue ao cliente", &record)?;
        }
        Command::Archive { id } => {
            let record = store.archive_item(&id)?;
            render::record(out, "Item arquivado", &record)?;
        }
        Command::List { json } => {
            let items = store.visible_items()?;
            if json {
                serde_json::to_writer_pretty(&mut *out, &items)
                    .context("Falha ao serializar itens")?;
                writeln!(out)?;
            } else {
                render::items(out, &items)?;
            }
        }
        Command::Stats => {
            let stats = store.stats()?;
            render::stats(out, &stats)?;
        }
        Command::Departments => render::departments(out)?,
    }
    Ok(())
}
