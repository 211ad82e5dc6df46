//! Command handlers.

use std::io::Write;
use std::sync::Arc;

use anyhow::bail;
use linkhub_application::{ApiClient, AuthService, ContentService, GroupService, LinkParser};
use linkhub_domain::{
    ContentFilters, CreateGroupRequest, InviteMembersRequest, PaginationParams, RegisterRequest,
};
use serde::Serialize;

use crate::cli::{Command, ContentsCommand, GroupsCommand};

pub async fn execute(command: Command, client: Arc<ApiClient>) -> anyhow::Result<()> {
    let auth = AuthService::new(client.clone());

    match command {
        Command::Login { email, password } => {
            let session = auth.login(&email, &password).await?;
            println!("Logged in as {} <{}>", session.user.username, session.user.email);
        }
        Command::Register {
            username,
            email,
            password,
            phone,
        } => {
            let mut request = RegisterRequest::email(username, email, password);
            if let Some(phone) = phone {
                request = request.with_phone(phone);
            }
            let session = auth.register(&request).await?;
            println!("Registered and logged in as {}", session.user.username);
        }
        Command::PhoneLogin { phone, code } => {
            let session = auth.phone_login(&phone, &code).await?;
            println!("Logged in as {}", session.user.username);
        }
        Command::SendCode { phone } => {
            auth.send_verification_code(&phone).await?;
            println!("Verification code sent to {phone}");
        }
        Command::ResetPassword { email } => {
            auth.reset_password(&email).await?;
            println!("Password reset instructions sent to {email}");
        }
        Command::Logout => {
            auth.logout().await;
            println!("Logged out");
        }
        Command::Whoami => match auth.current_user().await {
            Some(user) => print_json(&user)?,
            None => bail!("not logged in"),
        },
        Command::Status => {
            let status = client.tokens().status().await;
            println!("{}", status.display_message());
        }
        Command::Refresh => {
            auth.refresh_token().await?;
            println!("{}", client.tokens().status().await.display_message());
        }
        Command::Parse {
            url,
            group,
            ai,
            provider,
        } => {
            if !LinkParser::is_supported_platform(&url) {
                eprintln!("warning: {url} is not on a supported platform, parsing may fail");
            }
            let parser = LinkParser::new(ContentService::new(client));
            if ai {
                let result = parser
                    .parse_url_with_ai(&url, group, provider.map(Into::into))
                    .await?;
                print_json(&result)?;
            } else {
                print_json(&parser.parse_url(&url, group).await?)?;
            }
        }
        Command::Contents { action } => contents(action, ContentService::new(client)).await?,
        Command::Groups { action } => groups(action, GroupService::new(client)).await?,
    }
    Ok(())
}

async fn contents(action: ContentsCommand, service: ContentService) -> anyhow::Result<()> {
    match action {
        ContentsCommand::List {
            page,
            page_size,
            search,
            platform,
            group,
        } => {
            let filters = ContentFilters {
                platform,
                search,
                group_id: group,
                ..ContentFilters::default()
            };
            let page = service
                .list(&filters, &PaginationParams::page(page, page_size))
                .await?;
            print_json(&page)?;
        }
        ContentsCommand::Get { id } => print_json(&service.get(id).await?)?,
        ContentsCommand::Delete { id } => {
            service.delete(id).await?;
            println!("Deleted content {id}");
        }
        ContentsCommand::Stats { group } => print_json(&service.stats(group).await?)?,
        ContentsCommand::Export {
            format,
            output,
            group,
        } => {
            let filters = ContentFilters {
                group_id: group,
                ..ContentFilters::default()
            };
            let bytes = service.export(&filters, format.into()).await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, &bytes).await?;
                    println!("Wrote {} bytes to {}", bytes.len(), path.display());
                }
                None => std::io::stdout().lock().write_all(&bytes)?,
            }
        }
    }
    Ok(())
}

async fn groups(action: GroupsCommand, service: GroupService) -> anyhow::Result<()> {
    match action {
        GroupsCommand::List { page, page_size } => {
            print_json(&service.list(&PaginationParams::page(page, page_size)).await?)?;
        }
        GroupsCommand::Get { id } => print_json(&service.get(id).await?)?,
        GroupsCommand::Create {
            name,
            description,
            private,
        } => {
            let group = service
                .create(&CreateGroupRequest::new(name, description).private(private))
                .await?;
            print_json(&group)?;
        }
        GroupsCommand::Delete { id } => {
            service.delete(id).await?;
            println!("Deleted group {id}");
        }
        GroupsCommand::Invite {
            id,
            emails,
            role,
            message,
        } => {
            let count = emails.len();
            let request = InviteMembersRequest {
                emails,
                role: role.map(Into::into),
                message,
            };
            service.invite_members(id, &request).await?;
            println!("Invited {count} member(s) to group {id}");
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
